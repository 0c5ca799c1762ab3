mod common;

use std::fs;

use common::{list_files, prompt_file, write_tree, RefusingPrompter, ScriptedPrompter};
use stencil::constants::{COLLECTION_CHOICE_VAR, DEFAULT_COLLECTION_PROMPT};
use stencil::error::{Error, Result};
use stencil::prompt::DefaultsPrompter;
use stencil::renderer::TemplateRenderer;
use stencil::sniff::ContentSniffer;
use stencil::tree::LocalTree;
use stencil::{ScaffoldOptions, Scaffolder, VariableBindings};
use tempfile::TempDir;

fn overrides(pairs: &[(&str, &str)]) -> ScaffoldOptions {
    ScaffoldOptions {
        overrides: pairs.iter().copied().collect::<VariableBindings>(),
        ..Default::default()
    }
}

fn scaffolder(options: ScaffoldOptions, prompter: ScriptedPrompter) -> Scaffolder {
    Scaffolder::new(options).unwrap().with_prompter(prompter)
}

#[test_log::test]
fn test_ignored_entries_never_reach_output() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("prompts.toml", &prompt_file("name", "")),
            (".override.toml", "name = \"test\"\n"),
            (".git/HEAD", "ref: refs/heads/main\n"),
            (".git/config", "[core]\n"),
            ("template.go", "package {{ name }}\n"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let prompter = ScriptedPrompter::default();
    scaffolder(ScaffoldOptions::default(), prompter.clone())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(list_files(&project), ["template.go"]);
    assert!(!project.join(".git").exists());
    assert_eq!(fs::read_to_string(project.join("template.go")).unwrap(), "package test\n");
    assert!(prompter.asked().is_empty());
}

#[test]
fn test_output_matches_expected_tree() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("prompts.toml", &prompt_file("project", "")),
            ("README.md", "# {{ project | title }}\n"),
            ("src/{{ project | snake_case }}.rs", "pub const NAME: &str = \"{{ project }}\";\n"),
        ],
    );
    let expected = TempDir::new().unwrap();
    write_tree(
        expected.path(),
        &[
            ("README.md", "# Hello World\n"),
            ("src/hello_world.rs", "pub const NAME: &str = \"hello world\";\n"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(ScaffoldOptions::default(), ScriptedPrompter::new(&["hello world"]))
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert!(!dir_diff::is_different(&project, expected.path()).unwrap());
}

#[test]
fn test_no_prompt_file_means_no_bindings_and_no_prompting() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("static.txt", "nothing to see\n")]);
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let scaffolder = Scaffolder::new(overrides(&[("ignored", "x")]))
        .unwrap()
        .with_prompter(RefusingPrompter);
    let tree = LocalTree::open(template.path()).unwrap();
    assert!(scaffolder.resolve(&tree).unwrap().is_empty());

    scaffolder.scaffold(template.path().to_str().unwrap(), &project).unwrap();
    assert_eq!(fs::read_to_string(project.join("static.txt")).unwrap(), "nothing to see\n");
}

#[test]
fn test_override_precedence() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", &prompt_file("P", "d")), ("value.txt", "{{ P }}")]);
    let tree = LocalTree::open(template.path()).unwrap();

    let resolve = |options: ScaffoldOptions| {
        Scaffolder::new(options)
            .unwrap()
            .with_prompter(DefaultsPrompter)
            .resolve(&tree)
            .unwrap()
    };

    assert_eq!(resolve(ScaffoldOptions::default()).get("P"), Some("d"));

    fs::write(template.path().join(".override.toml"), "P = \"o\"\n").unwrap();
    assert_eq!(resolve(ScaffoldOptions::default()).get("P"), Some("o"));
    assert_eq!(resolve(overrides(&[("P", "c")])).get("P"), Some("c"));
}

#[test]
fn test_caller_default_seeds_prompt() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", &prompt_file("name", "static"))]);
    let tree = LocalTree::open(template.path()).unwrap();

    let prompter = ScriptedPrompter::default();
    let options = ScaffoldOptions {
        defaults: [("name", "seeded")].into_iter().collect(),
        ..Default::default()
    };
    let bindings = scaffolder(options, prompter.clone()).resolve(&tree).unwrap();

    assert_eq!(bindings.get("name"), Some("seeded"));
    assert_eq!(prompter.asked()[0].default, "seeded");
}

#[test]
fn test_reserved_name_rejected_before_prompting() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[("prompts.toml", &prompt_file("builder", "")), ("file.txt", "{{ builder }}")],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let options = ScaffoldOptions { reserved: vec!["builder".to_string()], ..Default::default() };
    let err = Scaffolder::new(options)
        .unwrap()
        .with_prompter(RefusingPrompter)
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap_err();

    assert!(matches!(err, Error::ReservedNameError { ref name, .. } if name == "builder"));
    assert!(!project.exists());
}

#[test]
fn test_reserved_name_in_override_file_rejected() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[("prompts.toml", &prompt_file("name", "")), (".override.toml", "builder = \"x\"\n")],
    );
    let tree = LocalTree::open(template.path()).unwrap();
    let options = ScaffoldOptions { reserved: vec!["builder".to_string()], ..Default::default() };

    let err = Scaffolder::new(options)
        .unwrap()
        .with_prompter(RefusingPrompter)
        .resolve(&tree)
        .unwrap_err();
    assert!(matches!(err, Error::ReservedNameError { .. }));
}

#[test]
fn test_malformed_prompt_file() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", "[[prompt]\nname = ")]);
    let tree = LocalTree::open(template.path()).unwrap();

    let err = scaffolder(ScaffoldOptions::default(), ScriptedPrompter::default())
        .resolve(&tree)
        .unwrap_err();
    match err {
        Error::ConfigFormatError { path, .. } => assert!(path.ends_with("prompts.toml")),
        other => panic!("Expected ConfigFormatError, got {other:?}"),
    }
}

#[test]
fn test_no_clobber() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", &prompt_file("name", "")), ("a.txt", "{{ name }}")]);
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");
    let source = template.path().to_str().unwrap();

    scaffolder(overrides(&[("name", "first")]), ScriptedPrompter::default())
        .scaffold(source, &project)
        .unwrap();

    let err = scaffolder(overrides(&[("name", "second")]), ScriptedPrompter::default())
        .scaffold(source, &project)
        .unwrap_err();

    assert!(matches!(err, Error::TargetExistsError { .. }));
    assert_eq!(fs::read_to_string(project.join("a.txt")).unwrap(), "first");
}

#[test]
fn test_path_substitution() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("prompts.toml", &prompt_file("duck", "")),
            ("{{ duck }}/{{ duck }}.go", "const Sound = \"{{ duck | upper }}\"\n"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(overrides(&[("duck", "quack")]), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    let content = fs::read_to_string(project.join("quack").join("quack.go")).unwrap();
    assert!(content.contains("QUACK"));
    assert_eq!(list_files(&project), ["quack/quack.go"]);
}

#[test]
fn test_unbound_reference_leaves_no_output() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("prompts.toml", &prompt_file("name", "")),
            ("a.txt", "{{ name }}"),
            ("b.txt", "{{ undeclared }}"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let err = scaffolder(overrides(&[("name", "x")]), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap_err();

    match err {
        Error::SubstitutionError { path, .. } => assert_eq!(path, "b.txt"),
        other => panic!("Expected SubstitutionError, got {other:?}"),
    }
    assert!(!project.exists());
}

#[test]
fn test_binary_files_are_copied_verbatim() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", &prompt_file("name", ""))]);
    let blob: Vec<u8> = b"\x89PNG\0\0{{ name }}\xff".to_vec();
    fs::write(template.path().join("{{ name }}.png"), &blob).unwrap();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(overrides(&[("name", "logo")]), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(fs::read(project.join("logo.png")).unwrap(), blob);
}

#[cfg(unix)]
#[test]
fn test_permissions_preserved_with_owner_read_write() {
    use std::os::unix::fs::PermissionsExt;

    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("run.sh", "#!/bin/sh\necho hi\n"), ("locked.txt", "ro\n")]);
    fs::set_permissions(template.path().join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();
    fs::set_permissions(template.path().join("locked.txt"), fs::Permissions::from_mode(0o400))
        .unwrap();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(ScaffoldOptions::default(), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    let mode = |name: &str| fs::metadata(project.join(name)).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode("run.sh"), 0o755);
    assert_eq!(mode("locked.txt"), 0o600);
}

#[test]
fn test_extra_ignore_patterns() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("keep.txt", "k"), ("build/out.o", "o"), ("notes.tmp", "t")]);
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let options = ScaffoldOptions {
        extra_ignores: vec!["build".to_string(), "*.tmp".to_string()],
        ..Default::default()
    };
    let report = scaffolder(options, ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(list_files(&project), ["keep.txt"]);
    assert_eq!(report.files.len(), 1);
}

#[test]
fn test_write_failure_keeps_partial_output() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("prompts.toml", "[[prompt]]\nname = \"a\"\nprompt = \"A\"\n[[prompt]]\nname = \"b\"\nprompt = \"B\"\n"),
            ("{{ a }}/inner.txt", "first"),
            ("{{ b }}", "collides with the directory"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let err = scaffolder(overrides(&[("a", "same"), ("b", "same")]), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap_err();

    match err {
        Error::MaterializationIOError { path, .. } => assert_eq!(path, project.join("same")),
        other => panic!("Expected MaterializationIOError, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(project.join("same/inner.txt")).unwrap(), "first");
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_survive() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let template = TempDir::new().unwrap();
    let name = OsStr::from_bytes(b"data-\xff.bin");
    fs::write(template.path().join(name), b"payload").unwrap();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(ScaffoldOptions::default(), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(fs::read(project.join(name)).unwrap(), b"payload");
}

/// Treats every file as binary.
struct NothingIsText;

impl ContentSniffer for NothingIsText {
    fn is_text(&self, _content: &[u8]) -> bool {
        false
    }
}

/// Replaces `@name@` markers instead of evaluating templates.
struct MarkerRenderer;

impl TemplateRenderer for MarkerRenderer {
    fn render(&self, template: &str, bindings: &VariableBindings, _path: &str) -> Result<String> {
        Ok(template.replace("@name@", bindings.get("name").unwrap_or_default()))
    }
}

#[test]
fn test_injected_sniffer_decides_what_is_rendered() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("prompts.toml", &prompt_file("name", "")), ("a.txt", "{{ name }}")]);
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(overrides(&[("name", "x")]), ScriptedPrompter::default())
        .with_sniffer(NothingIsText)
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(fs::read_to_string(project.join("a.txt")).unwrap(), "{{ name }}");
}

#[test]
fn test_injected_renderer_handles_paths_and_contents() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[("prompts.toml", &prompt_file("name", "")), ("@name@.txt", "hello @name@, {{ kept }}")],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(overrides(&[("name", "duck")]), ScriptedPrompter::default())
        .with_renderer(MarkerRenderer)
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(fs::read_to_string(project.join("duck.txt")).unwrap(), "hello duck, {{ kept }}");
}

#[test]
fn test_sub_path_of_local_source() {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("README.md", "monorepo"),
            ("templates/go/prompts.toml", &prompt_file("name", "")),
            ("templates/go/main.go", "package {{ name }}\n"),
        ],
    );
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");
    let source = template.path().to_str().unwrap();

    let options = ScaffoldOptions {
        sub_path: Some("templates/go".into()),
        ..overrides(&[("name", "main")])
    };
    scaffolder(options, ScriptedPrompter::default()).scaffold(source, &project).unwrap();
    assert_eq!(list_files(&project), ["main.go"]);

    let options = ScaffoldOptions { sub_path: Some("templates/rust".into()), ..Default::default() };
    let err = scaffolder(options, ScriptedPrompter::default())
        .scaffold(source, &out.path().join("other"))
        .unwrap_err();
    assert!(matches!(err, Error::FetchError { .. }));
    assert!(!out.path().join("other").exists());
}

fn collection_template() -> TempDir {
    let template = TempDir::new().unwrap();
    write_tree(
        template.path(),
        &[
            ("option1/prompts.toml", &prompt_file("test", "")),
            ("option1/template.go", "package {{ test }}\n"),
            ("option2/prompts.toml", &prompt_file("test", "")),
            ("option2/other.go", "package {{ test }}\n"),
            ("docs/README.md", "not a template"),
        ],
    );
    template
}

#[test_log::test]
fn test_collection_round_trip() {
    let template = collection_template();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let prompter = ScriptedPrompter::new(&["option1", "test"]);
    scaffolder(ScaffoldOptions::default(), prompter.clone())
        .scaffold_collection(template.path().to_str().unwrap(), "Choose your option", &project)
        .unwrap();

    assert_eq!(list_files(&project), ["template.go"]);
    assert_eq!(fs::read_to_string(project.join("template.go")).unwrap(), "package test\n");

    let asked = prompter.asked();
    assert_eq!(asked[0].name, COLLECTION_CHOICE_VAR);
    assert_eq!(asked[0].label, "Choose your option");
    assert_eq!(asked[0].choices, ["option1", "option2"]);
    assert_eq!(asked[1].name, "test");
}

#[test]
fn test_plain_scaffold_of_collection_asks_to_choose() {
    let template = collection_template();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let prompter = ScriptedPrompter::new(&["option2", "demo"]);
    scaffolder(ScaffoldOptions::default(), prompter.clone())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(prompter.asked()[0].label, DEFAULT_COLLECTION_PROMPT);
    assert_eq!(list_files(&project), ["other.go"]);
}

#[test]
fn test_collection_choice_by_override() {
    let template = collection_template();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let options = overrides(&[(COLLECTION_CHOICE_VAR, "option1"), ("test", "auto")]);
    Scaffolder::new(options)
        .unwrap()
        .with_prompter(RefusingPrompter)
        .scaffold_collection(template.path().to_str().unwrap(), "Pick", &project)
        .unwrap();

    assert_eq!(fs::read_to_string(project.join("template.go")).unwrap(), "package auto\n");
}

#[test]
fn test_collection_choice_from_collection_override_file() {
    let template = collection_template();
    fs::write(template.path().join(".override.toml"), "__ScaffoldUrl = \"option2\"\n").unwrap();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    scaffolder(overrides(&[("test", "x")]), ScriptedPrompter::default())
        .scaffold(template.path().to_str().unwrap(), &project)
        .unwrap();

    assert_eq!(list_files(&project), ["other.go"]);
}

#[test]
fn test_invalid_collection_choice() {
    let template = collection_template();
    let out = TempDir::new().unwrap();
    let project = out.path().join("project");

    let err = Scaffolder::new(overrides(&[(COLLECTION_CHOICE_VAR, "docs")]))
        .unwrap()
        .with_prompter(RefusingPrompter)
        .scaffold_collection(template.path().to_str().unwrap(), "Pick", &project)
        .unwrap_err();

    assert!(matches!(err, Error::CollectionSelectionError { .. }));
    assert!(!project.exists());
}

#[test]
fn test_collection_operation_on_plain_template() {
    let template = TempDir::new().unwrap();
    write_tree(template.path(), &[("file.txt", "x")]);
    let out = TempDir::new().unwrap();

    let err = scaffolder(ScaffoldOptions::default(), ScriptedPrompter::default())
        .scaffold_collection(template.path().to_str().unwrap(), "Pick", &out.path().join("p"))
        .unwrap_err();
    assert!(matches!(err, Error::CollectionSelectionError { .. }));
}

#[test]
fn test_missing_template_is_fetch_error() {
    let out = TempDir::new().unwrap();
    let missing = out.path().join("no-such-template");

    let err = scaffolder(ScaffoldOptions::default(), ScriptedPrompter::default())
        .scaffold(missing.to_str().unwrap(), &out.path().join("project"))
        .unwrap_err();
    assert!(matches!(err, Error::FetchError { .. }));
}
