use crate::{GradleError, GradleScript, Result, SyntheticDependency};
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Directory (relative to the workspace root) that receives the synthetic `pom.xml`.
pub const DEFAULT_SYNTHETIC_POM_DIR: &str = ".jls";

/// Lombok version injected when a build script mentions Lombok.
pub const LOMBOK_VERSION: &str = "1.18.24";

const BUILD_SCRIPTS: [&str; 2] = ["build.gradle", "build.gradle.kts"];

/// The Gradle build script at the root of `workspace_root`, if any.
pub fn find_gradle_script(workspace_root: &Path) -> Option<PathBuf> {
    BUILD_SCRIPTS
        .iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Translate `script_path` into `<workspace_root>/<pom_dir>/pom.xml` and return that path.
pub fn write_synthetic_pom(
    workspace_root: &Path,
    script_path: &Path,
    pom_dir: &str,
) -> Result<PathBuf> {
    let contents =
        std::fs::read_to_string(script_path).map_err(|source| GradleError::ReadScript {
            path: script_path.to_path_buf(),
            source,
        })?;
    let script = GradleScript::parse(&contents);
    tracing::debug!(
        target: "infer.gradle",
        script = %script_path.display(),
        dependencies = script.dependencies.len(),
        platform_dependencies = script.platform_dependencies.len(),
        lombok = script.uses_lombok,
        spring_boot = ?script.spring_boot_version,
        "scanned gradle build script"
    );

    let dir = workspace_root.join(pom_dir);
    let pom = dir.join("pom.xml");
    std::fs::create_dir_all(&dir)
        .and_then(|()| std::fs::write(&pom, render_synthetic_pom(&script)))
        .map_err(|source| GradleError::WritePom {
            path: pom.clone(),
            source,
        })?;

    Ok(pom)
}

/// Render a minimal Maven descriptor that declares the same dependencies as `script`.
pub fn render_synthetic_pom(script: &GradleScript) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n\
         \x20        xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n\
         \x20        xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 \
         http://maven.apache.org/xsd/maven-4.0.0.xsd\">\n",
    );
    out.push_str("  <modelVersion>4.0.0</modelVersion>\n");

    if let Some(version) = &script.spring_boot_version {
        out.push_str("  <parent>\n");
        element(&mut out, 4, "groupId", "org.springframework.boot");
        element(&mut out, 4, "artifactId", "spring-boot-starter-parent");
        element(&mut out, 4, "version", version);
        out.push_str("  </parent>\n");
    }

    element(&mut out, 2, "groupId", "infer.synthetic");
    element(&mut out, 2, "artifactId", "gradle-workspace");
    element(&mut out, 2, "version", "0.0.0-SNAPSHOT");

    if !script.platform_dependencies.is_empty() {
        out.push_str("  <dependencyManagement>\n");
        out.push_str("    <dependencies>\n");
        for dep in &script.platform_dependencies {
            dependency(&mut out, 6, dep, true);
        }
        out.push_str("    </dependencies>\n");
        out.push_str("  </dependencyManagement>\n");
    }

    out.push_str("  <dependencies>\n");
    if script.uses_lombok {
        out.push_str("    <dependency>\n");
        element(&mut out, 6, "groupId", "org.projectlombok");
        element(&mut out, 6, "artifactId", "lombok");
        element(&mut out, 6, "version", LOMBOK_VERSION);
        element(&mut out, 6, "scope", "provided");
        out.push_str("    </dependency>\n");
    }
    for dep in &script.dependencies {
        dependency(&mut out, 4, dep, false);
    }
    out.push_str("  </dependencies>\n");

    if script.uses_lombok {
        out.push_str(
            "  <build>\n\
             \x20   <plugins>\n\
             \x20     <plugin>\n\
             \x20       <groupId>org.apache.maven.plugins</groupId>\n\
             \x20       <artifactId>maven-compiler-plugin</artifactId>\n\
             \x20       <configuration>\n\
             \x20         <annotationProcessorPaths>\n\
             \x20           <path>\n\
             \x20             <groupId>org.projectlombok</groupId>\n\
             \x20             <artifactId>lombok</artifactId>\n",
        );
        element(&mut out, 14, "version", LOMBOK_VERSION);
        out.push_str(
            "            </path>\n\
             \x20         </annotationProcessorPaths>\n\
             \x20       </configuration>\n\
             \x20     </plugin>\n\
             \x20   </plugins>\n\
             \x20 </build>\n",
        );
    }

    out.push_str("</project>\n");
    out
}

fn dependency(out: &mut String, indent: usize, dep: &SyntheticDependency, bom: bool) {
    let _ = writeln!(out, "{:indent$}<dependency>", "");
    element(out, indent + 2, "groupId", &dep.group_id());
    element(out, indent + 2, "artifactId", &dep.artifact_id);
    if let Some(version) = dep.version() {
        element(out, indent + 2, "version", &version);
    }
    if bom {
        element(out, indent + 2, "type", "pom");
    }
    if dep.test_scope {
        element(out, indent + 2, "scope", "test");
    }
    let _ = writeln!(out, "{:indent$}</dependency>", "");
}

fn element(out: &mut String, indent: usize, name: &str, text: &str) {
    let _ = writeln!(out, "{:indent$}<{name}>{}</{name}>", "", escape(text));
}
