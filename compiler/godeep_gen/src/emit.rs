//! Assembling and checking the generated file.

use godeep_parse::{parse_source, ParseMode};

use crate::{GenError, ImportTable};

/// Header, package clause, import block and methods, in that order.
pub fn assemble(invocation: &str, package: &str, imports: &ImportTable, methods: &[String]) -> String {
    let mut text = format!("// Code generated by {invocation}; DO NOT EDIT.\n\npackage {package}\n");
    if !imports.is_empty() {
        text.push_str("\nimport (\n");
        for (path, alias) in imports.iter() {
            text.push('\t');
            text.push_str(&ImportTable::spec_line(path, alias));
            text.push('\n');
        }
        text.push_str(")\n");
    }
    for method in methods {
        text.push('\n');
        text.push_str(method);
    }
    text
}

/// Parse the generated text as Go to catch anything malformed before it
/// is written out.
pub fn validate(text: &str) -> Result<(), GenError> {
    match parse_source(text, ParseMode::Full) {
        Ok(file) => {
            tracing::trace!(decls = file.decls.len(), "generated source parses");
            Ok(())
        }
        Err(err) => Err(GenError::MalformedOutput {
            error: format!("{}: {err}", err.span().line_col(text)),
            generated: text.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_layout() {
        let mut imports = ImportTable::new();
        imports.alias_for("time", "time");
        imports.alias_for("gopkg.in/yaml.v3", "yaml");
        let methods = vec!["func a() {}\n".to_owned(), "func b() {}\n".to_owned()];
        let text = assemble("godeep -t A", "m", &imports, &methods);
        assert_eq!(
            text,
            "// Code generated by godeep -t A; DO NOT EDIT.\n\
             \n\
             package m\n\
             \n\
             import (\n\
             \tyaml \"gopkg.in/yaml.v3\"\n\
             \t\"time\"\n\
             )\n\
             \n\
             func a() {}\n\
             \n\
             func b() {}\n"
        );
        assert_eq!(validate(&text), Ok(()));
    }

    #[test]
    fn test_validate_reports_location() {
        let Err(GenError::MalformedOutput { error, generated }) =
            validate("package m\n\nfunc f() {\n\tx := \n}\n")
        else {
            panic!("expected malformed output");
        };
        assert!(error.starts_with("5:1: "), "{error}");
        assert!(generated.starts_with("package m"));
    }
}
