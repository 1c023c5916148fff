use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

const PRG: &str = "openapi_route_scaffolder";

fn scaffold(source: &str, destination: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin(PRG)?;
    cmd.env_remove("RUST_LOG")
        .arg("-s")
        .arg(source)
        .arg("-d")
        .arg(destination);
    Ok(cmd)
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}

#[test]
fn usage() -> TestResult {
    for flag in &["-h", "--help"] {
        Command::cargo_bin(PRG)?
            .arg(flag)
            .assert()
            .stdout(predicate::str::contains("Usage"));
    }
    Ok(())
}

#[test]
fn missing_required_arguments_is_a_usage_error() -> TestResult {
    Command::cargo_bin(PRG)?
        .env_remove("ROUTE_SCAFFOLD_SOURCE")
        .env_remove("ROUTE_SCAFFOLD_DESTINATION")
        .arg("-s")
        .arg("tests/inputs/petstore.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--destination"));
    Ok(())
}

#[test]
fn gen_petstore_routes() -> TestResult {
    let out = tempdir()?;
    let routes = out.path().join("routes");
    scaffold("tests/inputs/petstore.json", &routes)?
        .assert()
        .success()
        .stdout(predicate::str::contains("6 written"));

    assert_eq!(count_files(&routes), 6);
    for file in [
        "pets/get.ts",
        "pets/post.ts",
        "pets/$petId/get.ts",
        "pets/$petId/delete.ts",
        "pets/$petId/photos/$photoId/get.ts",
        "pets/$petId/photos/$photoId/put.ts",
    ] {
        assert!(routes.join(file).is_file(), "missing {file}");
    }

    let post = fs::read_to_string(routes.join("pets/post.ts"))?;
    assert!(post.contains(" * POST /pets\n"));
    assert!(post.contains("    // Bearer token\n    private: true,\n"));
    assert!(post.contains("\"body\": {"));
    assert!(post.contains("\"tag\""));
    assert!(post.ends_with("export default postRoute;\n"));

    let delete = fs::read_to_string(routes.join("pets/$petId/delete.ts"))?;
    assert!(delete.contains("\"X-Reason\""));
    assert!(delete.contains("\"Why the pet is removed\""));
    assert!(!delete.contains("\"Authorization\""));
    assert!(!delete.contains("\"required\""));
    assert!(delete.contains("res.send('Hello /pets/$petId');"));

    let listing = fs::read_to_string(routes.join("pets/get.ts"))?;
    assert!(listing.contains("    schema: {},\n"));
    assert!(!listing.contains("private"));
    Ok(())
}

#[test]
fn unresolved_body_reference_still_generates() -> TestResult {
    let out = tempdir()?;
    scaffold("tests/inputs/petstore.json", out.path())?
        .assert()
        .success()
        .stderr(predicate::str::contains("#/components/schemas/Photo"));

    let put = fs::read_to_string(out.path().join("pets/$petId/photos/$photoId/put.ts"))?;
    assert!(put.contains("const putRoute = {"));
    assert!(!put.contains("\"body\""));
    Ok(())
}

#[test]
fn rerun_keeps_edited_files() -> TestResult {
    let out = tempdir()?;
    scaffold("tests/inputs/users.yaml", out.path())?
        .assert()
        .success();

    let patch = out.path().join("users/$id/posts/$postId/patch.ts");
    fs::write(&patch, "// hand written\n")?;
    scaffold("tests/inputs/users.yaml", out.path())?
        .assert()
        .success()
        .stdout(predicate::str::contains("0 written, 2 skipped"));
    assert_eq!(fs::read_to_string(&patch)?, "// hand written\n");

    scaffold("tests/inputs/users.yaml", out.path())?
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 overwritten"));
    let regenerated = fs::read_to_string(&patch)?;
    assert!(regenerated.contains("\"X-Request-Id\""));
    assert!(regenerated.contains("\"required\": [\n                \"X-Request-Id\"\n            ]"));
    Ok(())
}

#[test]
fn module_styles_differ_only_in_export() -> TestResult {
    let ts = tempdir()?;
    let js = tempdir()?;
    scaffold("tests/inputs/users.yaml", ts.path())?
        .args(["-t", "static-export"])
        .assert()
        .success();
    scaffold("tests/inputs/users.yaml", js.path())?
        .args(["--type", "dynamic-assignment"])
        .assert()
        .success();

    let ts_text = fs::read_to_string(ts.path().join("status/get.ts"))?;
    let js_text = fs::read_to_string(js.path().join("status/get.js"))?;
    assert!(ts_text.ends_with("export default getRoute;\n"));
    assert!(js_text.ends_with("module.exports = getRoute;\n"));
    assert_eq!(
        ts_text.trim_end_matches("export default getRoute;\n"),
        js_text.trim_end_matches("module.exports = getRoute;\n")
    );
    Ok(())
}

#[test]
fn invalid_document_creates_nothing() -> TestResult {
    let out = tempdir()?;
    let routes = out.path().join("routes");
    scaffold("tests/inputs/invalid.json", &routes)?
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ValidationError"));
    assert!(!routes.exists());
    Ok(())
}

#[test]
fn missing_source_fails() -> TestResult {
    let out = tempdir()?;
    let routes = out.path().join("routes");
    scaffold("tests/inputs/nope.yaml", &routes)?
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SourceNotFound"));
    assert!(!routes.exists());
    Ok(())
}

#[test]
fn strict_validation_is_opt_in() -> TestResult {
    let out = tempdir()?;
    let routes = out.path().join("routes");
    scaffold("tests/inputs/dangling.yaml", &routes)?
        .arg("--validate-spec")
        .assert()
        .failure()
        .stderr(predicate::str::contains("#/components/schemas/Account"))
        .stderr(predicate::str::contains("\"accountId\" is not declared"));
    assert!(!routes.exists());

    scaffold("tests/inputs/dangling.yaml", &routes)?
        .assert()
        .success();
    assert!(routes.join("accounts/$accountId/post.ts").is_file());
    Ok(())
}
