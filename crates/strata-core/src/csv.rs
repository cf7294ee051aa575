/// Split one CSV record into fields, honoring double-quoted fields.
///
/// External tools (cloc, lizard) emit comma-separated reports where file
/// paths may contain commas; such fields arrive wrapped in double quotes
/// with `""` escaping a literal quote. Splitting on bare commas mangles
/// those paths, so fields are walked character by character instead.
///
/// # Examples
///
/// ```
/// use strata_core::split_csv_record;
///
/// let fields = split_csv_record(r#"Python,"dir/a,b.py",1,2,3"#);
/// assert_eq!(fields[1], "dir/a,b.py");
/// assert_eq!(fields.len(), 5);
/// ```
pub fn split_csv_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // Doubled quote inside a quoted field is a literal quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(
            split_csv_record("Python,file.py,1,2,3"),
            vec!["Python", "file.py", "1", "2", "3"]
        );
    }

    #[test]
    fn preserves_commas_inside_quotes() {
        let fields = split_csv_record(r#"Rust,"src/a, b.rs",0,0,10"#);
        assert_eq!(fields[1], "src/a, b.rs");
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let fields = split_csv_record(r#""say ""hi""",2"#);
        assert_eq!(fields[0], r#"say "hi""#);
        assert_eq!(fields[1], "2");
    }

    #[test]
    fn empty_fields_survive() {
        assert_eq!(split_csv_record("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split_csv_record(""), vec![""]);
    }

    #[test]
    fn trailing_comma_yields_empty_last_field() {
        assert_eq!(split_csv_record("a,b,"), vec!["a", "b", ""]);
    }
}
