use path_template_ex::PathTemplate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

fn load_test_suite(file_name: &str) -> TestSuite {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(file_name);

    let json =
        fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", file_name, e));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("Failed to parse {}: {}", file_name, e))
}

#[test]
fn check_all_test_suite() {
    let test_suite = load_test_suite("cases.json");
    for (section_name, section) in &test_suite.0 {
        let template = match PathTemplate::new(&section.template) {
            Ok(t) => t,
            Err(e) => {
                let kind = format!("{:?}", e.kind());
                assert_eq!(
                    section.error.as_deref(),
                    Some(kind.as_str()),
                    "{section_name}: failed to compile '{}': {e}",
                    section.template
                );
                continue;
            }
        };
        assert!(
            section.error.is_none(),
            "{section_name}: expected '{}' to fail to compile",
            section.template
        );

        for case in &section.parse {
            let m = template.parse(&case.path);
            if !case.matches {
                assert!(
                    m.is_none(),
                    "{section_name}: '{}' should not match '{}', got {m:?}",
                    case.path,
                    template
                );
                continue;
            }
            let Some(m) = m else {
                panic!("{section_name}: '{}' should match '{}'", case.path, template);
            };
            assert_eq!(m.path, case.path, "{section_name}");
            assert_eq!(
                serde_json::to_value(&m.params).unwrap(),
                case.params,
                "{section_name}: parse '{}'",
                case.path
            );
        }

        for case in &section.build {
            match (template.build(&case.params), &case.path, &case.error) {
                (Ok(path), Some(expected), None) => {
                    assert_eq!(&path, expected, "{section_name}: build {}", case.params)
                }
                (Err(e), None, Some(expected)) => {
                    assert_eq!(&format!("{:?}", e.kind()), expected, "{section_name}: {e}")
                }
                (result, _, _) => panic!(
                    "{section_name}: build {} on '{}' gave {result:?}",
                    case.params, template
                ),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TestSuite(pub BTreeMap<String, TestSection>);

#[derive(Debug, Deserialize)]
pub struct TestSection {
    pub template: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub parse: Vec<ParseCase>,
    #[serde(default)]
    pub build: Vec<BuildCase>,
}

#[derive(Debug, Deserialize)]
pub struct ParseCase {
    pub path: String,
    /// `null` for a template without parameters.
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default = "matches_by_default")]
    pub matches: bool,
}

fn matches_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct BuildCase {
    pub params: serde_json::Value,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
