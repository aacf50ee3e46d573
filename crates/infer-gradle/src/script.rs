use regex::Regex;
use std::sync::OnceLock;

/// One `implementation` / `testImplementation` coordinate lifted from a build script.
///
/// `group_expr` and `version_expr` are the raw captures and still carry the `:`
/// that separated them from the artifact id; use [`SyntheticDependency::group_id`]
/// and [`SyntheticDependency::version`] for the cleaned-up values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDependency {
    pub group_expr: String,
    pub artifact_id: String,
    pub version_expr: Option<String>,
    pub test_scope: bool,
}

impl SyntheticDependency {
    pub fn group_id(&self) -> String {
        self.group_expr.replace(':', "")
    }

    pub fn version(&self) -> Option<String> {
        self.version_expr
            .as_deref()
            .map(|v| v.replace(':', ""))
            .filter(|v| !v.is_empty())
    }
}

/// What a Gradle build script tells us, as far as a line-by-line regex scan can see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradleScript {
    pub dependencies: Vec<SyntheticDependency>,
    /// `platform(...)` (BOM) imports; only supply versions.
    pub platform_dependencies: Vec<SyntheticDependency>,
    pub spring_boot_version: Option<String>,
    pub uses_lombok: bool,
}

fn implementation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"implementation[\s*,(platform]*['"](.*?:)(.*?)(:.*?)?['"]"#)
            .expect("valid regex")
    })
}

fn test_implementation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"testImplementation[\s*,(platform]*['"](.*?:)(.*?)(:.*?)?['"]"#)
            .expect("valid regex")
    })
}

fn spring_boot_plugin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Groovy: id 'org.springframework.boot' version '3.2.0'
        // Kotlin: id("org.springframework.boot") version "3.2.0"
        Regex::new(
            r#"id\s*\(?\s*['"]org\.springframework\.boot['"]\s*\)?\s+version\s+['"](.*?)['"]"#,
        )
        .expect("valid regex")
    })
}

impl GradleScript {
    /// Scan `contents` line by line.
    ///
    /// Each regex contributes at most one dependency per line. Any line that
    /// mentions `platform` anywhere routes its matches to
    /// [`GradleScript::platform_dependencies`], even when the matched call is not
    /// itself wrapped in `platform(...)`.
    pub fn parse(contents: &str) -> Self {
        let mut script = GradleScript::default();

        for line in contents.lines() {
            if line.contains("lombok") {
                script.uses_lombok = true;
            }
            if let Some(caps) = spring_boot_plugin_re().captures(line) {
                script.spring_boot_version = Some(caps[1].to_string());
            }

            let target = if line.contains("platform") {
                &mut script.platform_dependencies
            } else {
                &mut script.dependencies
            };
            for (re, test_scope) in [(implementation_re(), false), (test_implementation_re(), true)] {
                if let Some(dep) = capture_dependency(re, line, test_scope) {
                    target.push(dep);
                }
            }
        }

        script
    }
}

fn capture_dependency(re: &Regex, line: &str, test_scope: bool) -> Option<SyntheticDependency> {
    let caps = re.captures(line)?;
    Some(SyntheticDependency {
        group_expr: caps.get(1)?.as_str().to_string(),
        artifact_id: caps.get(2)?.as_str().to_string(),
        version_expr: caps.get(3).map(|m| m.as_str().to_string()),
        test_scope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_implementation_dependency() {
        let script = GradleScript::parse("    implementation 'com.g:a:1.0'\n");
        assert_eq!(script.dependencies.len(), 1);
        let dep = &script.dependencies[0];
        assert_eq!(dep.group_id(), "com.g");
        assert_eq!(dep.artifact_id, "a");
        assert_eq!(dep.version().as_deref(), Some("1.0"));
        assert!(!dep.test_scope);
        assert!(script.platform_dependencies.is_empty());
    }

    #[test]
    fn raw_captures_keep_separator_colons() {
        let script = GradleScript::parse("implementation 'com.g:a:1.0'");
        let dep = &script.dependencies[0];
        assert_eq!(dep.group_expr, "com.g:");
        assert_eq!(dep.version_expr.as_deref(), Some(":1.0"));
    }

    #[test]
    fn routes_platform_lines_to_bom_list() {
        let script = GradleScript::parse("testImplementation platform('com.g:bom:1.0')");
        assert!(script.dependencies.is_empty());
        assert_eq!(
            script.platform_dependencies,
            vec![SyntheticDependency {
                group_expr: "com.g:".into(),
                artifact_id: "bom".into(),
                version_expr: Some(":1.0".into()),
                test_scope: true,
            }]
        );
    }

    #[test]
    fn handles_kotlin_dsl_and_versionless_coordinates() {
        let script = GradleScript::parse(
            r#"
dependencies {
    implementation(platform("org.springframework.boot:spring-boot-dependencies:3.2.0"))
    implementation("org.springframework.boot:spring-boot-starter-web")
    testImplementation("org.junit.jupiter:junit-jupiter:5.10.1")
}
"#,
        );

        assert_eq!(script.platform_dependencies.len(), 1);
        assert_eq!(
            script.platform_dependencies[0].artifact_id,
            "spring-boot-dependencies"
        );
        assert!(!script.platform_dependencies[0].test_scope);

        assert_eq!(script.dependencies.len(), 2);
        assert_eq!(script.dependencies[0].artifact_id, "spring-boot-starter-web");
        assert_eq!(script.dependencies[0].version(), None);
        assert_eq!(script.dependencies[1].group_id(), "org.junit.jupiter");
        assert!(script.dependencies[1].test_scope);
    }

    #[test]
    fn ignores_project_and_file_dependencies() {
        let script = GradleScript::parse(
            "implementation project(':core')\nimplementation files('libs/a.jar')\n",
        );
        assert!(script.dependencies.is_empty());
    }

    #[test]
    fn detects_spring_boot_plugin_and_lombok() {
        let script = GradleScript::parse(
            "plugins {\n  id 'org.springframework.boot' version '3.1.5'\n}\n\
             dependencies {\n  compileOnly 'org.projectlombok:lombok'\n}\n",
        );
        assert_eq!(script.spring_boot_version.as_deref(), Some("3.1.5"));
        assert!(script.uses_lombok);
        assert!(script.dependencies.is_empty());

        let kotlin = GradleScript::parse(r#"id("org.springframework.boot") version "3.2.1""#);
        assert_eq!(kotlin.spring_boot_version.as_deref(), Some("3.2.1"));
        assert!(!kotlin.uses_lombok);
    }

    #[test]
    fn platform_substring_routes_unrelated_dependency_to_bom_list() {
        // Known limitation: routing looks at the whole line, not the call.
        let script = GradleScript::parse("implementation 'com.g:platform-utils:1.0'");
        assert!(script.dependencies.is_empty());
        assert_eq!(script.platform_dependencies.len(), 1);
        assert_eq!(script.platform_dependencies[0].artifact_id, "platform-utils");
    }
}
