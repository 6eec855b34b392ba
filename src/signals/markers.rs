//! Marker tables for heuristic detection
//!
//! Every table maps a lowercase marker to a label. Matching lives in the
//! extractors; adding a marker here is the only change needed to teach them
//! a new tool. Several markers may share a label, callers deduplicate.

/// Root entry name -> framework
pub const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("next.config.js", "Next.js"),
    ("next.config.mjs", "Next.js"),
    ("next.config.ts", "Next.js"),
    ("vue.config.js", "Vue"),
    ("vite.config.js", "Vue"),
    ("angular.json", "Angular"),
    ("svelte.config.js", "Svelte"),
    ("manage.py", "Django"),
    ("wsgi.py", "Django"),
    ("app.py", "Flask"),
    ("wsgi.py", "Flask"),
    ("main.py", "FastAPI"),
    ("rakefile", "Ruby on Rails"),
    ("gemfile", "Ruby on Rails"),
    ("config.ru", "Ruby on Rails"),
    ("pom.xml", "Spring Boot"),
    ("build.gradle", "Spring Boot"),
    ("artisan", "Laravel"),
    ("composer.json", "Laravel"),
    ("web.config", "ASP.NET"),
    ("appsettings.json", "ASP.NET"),
    ("program.cs", ".NET Core"),
    ("startup.cs", ".NET Core"),
];

/// Manifest dependency name -> framework
pub const DEPENDENCY_FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("react-dom", "React"),
    ("express", "Express"),
    ("next", "Next.js"),
    ("vue", "Vue"),
    ("@angular/core", "Angular"),
    ("svelte", "Svelte"),
    ("@nestjs/core", "NestJS"),
    ("fastify", "Fastify"),
    ("axum", "Axum"),
    ("actix-web", "Actix Web"),
    ("rocket", "Rocket"),
    ("warp", "Warp"),
    ("tokio", "Tokio"),
    ("tauri", "Tauri"),
];

/// Root entry name -> build tool
pub const BUILD_TOOL_MARKERS: &[(&str, &str)] = &[
    ("webpack.config.js", "Webpack"),
    ("vite.config.js", "Vite"),
    ("vite.config.ts", "Vite"),
    ("rollup.config.js", "Rollup"),
    ("gulpfile.js", "Gulp"),
    ("gruntfile.js", "Grunt"),
    ("tsconfig.json", "TypeScript"),
    ("babel.config.js", "Babel"),
    (".babelrc", "Babel"),
    ("makefile", "Make"),
    ("cmakelists.txt", "CMake"),
    ("build.gradle", "Gradle"),
    ("build.gradle.kts", "Gradle"),
    ("pom.xml", "Maven"),
    ("build.rs", "Cargo build script"),
];

/// Root entry name -> package manager
pub const PACKAGE_MANAGER_MARKERS: &[(&str, &str)] = &[
    ("package-lock.json", "npm"),
    ("yarn.lock", "Yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("requirements.txt", "pip"),
    ("pipfile", "Pipenv"),
    ("poetry.lock", "Poetry"),
    ("gemfile.lock", "Bundler"),
    ("composer.lock", "Composer"),
    ("go.mod", "Go Modules"),
    ("cargo.toml", "Cargo"),
];

/// Root entry name -> CI system
pub const CI_MARKERS: &[(&str, &str)] = &[
    (".github", "GitHub Actions"),
    (".gitlab-ci.yml", "GitLab CI"),
    (".travis.yml", "Travis CI"),
    (".circleci", "CircleCI"),
    ("jenkinsfile", "Jenkins"),
    (".drone.yml", "Drone CI"),
    ("azure-pipelines.yml", "Azure Pipelines"),
];

/// Root entries that hold a parseable dependency manifest, in lookup order
pub const MANIFEST_FILES: &[&str] = &["package.json", "Cargo.toml"];

/// Path fragments marking a linter configuration
pub const LINTER_CONFIGS: &[&str] = &[
    ".eslintrc",
    "eslint.config",
    ".pylintrc",
    ".rubocop.yml",
    "tslint.json",
    "clippy.toml",
    ".golangci.yml",
];

/// Path fragments marking a formatter configuration
pub const FORMATTER_CONFIGS: &[&str] = &[
    ".prettierrc",
    ".editorconfig",
    ".black",
    ".clang-format",
    "rustfmt.toml",
];

/// Path fragments marking a type-checker configuration
pub const TYPE_CHECKER_CONFIGS: &[&str] = &["tsconfig.json", "mypy.ini", "pyproject.toml"];

/// Path fragments marking a test runner configuration
pub const TEST_RUNNER_CONFIGS: &[&str] = &[
    "jest.config",
    "vitest.config",
    "pytest.ini",
    "phpunit.xml",
    "karma.conf",
];

/// Path fragments that mark a test file anywhere in the path
pub const TEST_PATH_FRAGMENTS: &[&str] = &["test", "spec", "__tests__"];

/// File suffixes that mark a test file
pub const TEST_FILE_SUFFIXES: &[&str] = &[
    ".test.ts",
    ".test.js",
    ".spec.ts",
    ".spec.js",
    "_test.py",
    "_spec.rb",
    "_test.go",
    "_test.rs",
];

/// Extensions counted as source files for the documentation signal
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "py", "java"];

/// Look up every label whose marker is in `names`.
///
/// `names` must already be lowercase. Output order follows the table.
pub(crate) fn matching_labels<'a>(
    table: &'a [(&'a str, &'a str)],
    names: &'a [String],
) -> impl Iterator<Item = &'a str> + 'a {
    table
        .iter()
        .filter(move |(marker, _)| names.iter().any(|n| n == marker))
        .map(|(_, label)| *label)
}

/// True if any fragment occurs in the lowercase `path`
pub(crate) fn contains_any(path: &str, fragments: &[&str]) -> bool {
    fragments.iter().any(|f| path.contains(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tables() -> Vec<&'static [(&'static str, &'static str)]> {
        vec![
            FRAMEWORK_MARKERS,
            DEPENDENCY_FRAMEWORKS,
            BUILD_TOOL_MARKERS,
            PACKAGE_MANAGER_MARKERS,
            CI_MARKERS,
        ]
    }

    #[test]
    fn test_markers_are_lowercase() {
        for table in all_tables() {
            for (marker, _) in table {
                assert_eq!(*marker, marker.to_lowercase(), "marker {marker} must be lowercase");
            }
        }
        for list in [
            LINTER_CONFIGS,
            FORMATTER_CONFIGS,
            TYPE_CHECKER_CONFIGS,
            TEST_RUNNER_CONFIGS,
            TEST_FILE_SUFFIXES,
        ] {
            for fragment in list {
                assert_eq!(*fragment, fragment.to_lowercase());
            }
        }
    }

    #[test]
    fn test_matching_labels_repeats_shared_labels() {
        let names = vec!["manage.py".to_string(), "wsgi.py".to_string()];
        let labels: Vec<_> = matching_labels(FRAMEWORK_MARKERS, &names).collect();
        assert_eq!(labels, vec!["Django", "Django", "Flask"]);
    }
}
