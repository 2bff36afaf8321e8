use modeldump_codec::Compression;
use modeldump_store::{CacheBuilder, IndexType};
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

/// Untextured triangle in the legacy model format.
const TRIANGLE: [u8; 30] = [
    0, 1, 3, 1, 64, 65, 65, 0x12, 0x34, 74, 54, 74, 0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03,
];

/// Texture 1 drawn with sprite 10.
const TEXTURE: [u8; 12] = [0x00, 0x10, 1, 1, 0x00, 0x0A, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0];

fn modeldump(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modeldump"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MODELDUMP_CACHE")
        .env_remove("MODELDUMP_CONVERT")
        .env_remove("MODELDUMP_KEEP_GOING")
        .output()
        .unwrap()
}

fn cache(dir: &Path, compression: Compression) {
    CacheBuilder::new()
        .compression(compression)
        .model(1, TRIANGLE.to_vec())
        .model(2, TRIANGLE.to_vec())
        .model(3, TRIANGLE.to_vec())
        .file(IndexType::Textures, 0, 1, TEXTURE.to_vec())
        .write_to(dir)
        .unwrap();
}

fn listing(dir: &Path) -> Vec<String> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    files
}

#[rstest]
#[case(Compression::None)]
#[case(Compression::Bzip2)]
#[case(Compression::Gzip)]
fn dump_and_convert(#[case] compression: Compression) {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    let out = root.path().join("out");
    cache(&cache_dir, compression);

    let output = modeldump(&[
        "--cache",
        cache_dir.to_str().unwrap(),
        "--models",
        out.to_str().unwrap(),
        "--convert",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Dumped 3 models, converted 3\n");
    assert_eq!(
        listing(&out),
        ["1.model", "1.mtl", "1.obj", "2.model", "2.mtl", "2.obj", "3.model", "3.mtl", "3.obj"]
    );
    assert_eq!(fs::read(out.join("2.model")).unwrap(), TRIANGLE);
}

#[test]
fn dump_only() {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    let out = root.path().join("out");
    cache(&cache_dir, Compression::Gzip);

    let output = modeldump(&["-c", cache_dir.to_str().unwrap(), "--models", out.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Dumped 3 models\n");
    assert_eq!(listing(&out), ["1.model", "2.model", "3.model"]);

    // A second run leaves identical files.
    let first = fs::read(out.join("1.model")).unwrap();
    assert!(modeldump(&["-c", cache_dir.to_str().unwrap(), "--models", out.to_str().unwrap()]).status.success());
    assert_eq!(fs::read(out.join("1.model")).unwrap(), first);
}

#[test]
fn missing_models_flag() {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    cache(&cache_dir, Compression::Gzip);
    let before = listing(root.path());

    let output = modeldump(&["-c", cache_dir.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(listing(root.path()), before);
}

#[rstest]
#[case::absent(false)]
#[case::no_cache_files(true)]
fn invalid_cache(#[case] create: bool) {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    if create {
        fs::create_dir(&cache_dir).unwrap();
        fs::write(cache_dir.join("readme.txt"), b"not a cache").unwrap();
    }
    let out = root.path().join("out");

    let output = modeldump(&["-c", cache_dir.to_str().unwrap(), "--models", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid cache"));
    assert!(output.stdout.is_empty());
    assert!(!out.exists());
}

#[test]
fn keep_going_still_fails() {
    let root = tempfile::tempdir().unwrap();
    let cache_dir = root.path().join("cache");
    let out = root.path().join("out");
    CacheBuilder::new()
        .model(1, TRIANGLE.to_vec())
        .model(2, vec![0xFF, 0xFF])
        .file(IndexType::Textures, 0, 1, TEXTURE.to_vec())
        .write_to(&cache_dir)
        .unwrap();
    let args = [
        "-c",
        cache_dir.to_str().unwrap(),
        "--models",
        out.to_str().unwrap(),
        "--convert",
    ];

    let output = modeldump(&args);
    assert_eq!(output.status.code(), Some(1));
    assert!(!out.join("2.obj").exists());

    let mut keep_going = args.to_vec();
    keep_going.push("--keep-going");
    let output = modeldump(&keep_going);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Dumped 2 models, converted 1\n");
    assert!(out.join("1.obj").exists());
    assert!(out.join("2.model").exists());
    assert!(!out.join("2.obj").exists());
}
