//! Runs the `s3crypt` binary to check that configuration falls back to the
//! environment. Every case stops before any network access.

use std::process::{Command, Output};

const ENV_VARS: &[&str] = &[
    "AWS_REGION",
    "S3CRYPT_BUCKET",
    "S3CRYPT_OBJECT_KEY",
    "S3CRYPT_ENDPOINT",
    "S3CRYPT_KMS_KEY_ID",
    "S3CRYPT_MASTER_KEY",
    "S3CRYPT_INSTRUCTION_FILE",
    "S3CRYPT_LEGACY_KMS",
    "RUST_LOG",
];

fn s3crypt(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_s3crypt"));
    for name in ENV_VARS {
        command.env_remove(name);
    }
    command.envs(env.iter().copied()).args(args).output().unwrap()
}

#[test]
fn missing_bucket_is_a_usage_error() {
    let output = s3crypt(&["upload"], &[("S3CRYPT_OBJECT_KEY", "hello.txt")]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--bucket"), "{stderr}");
}

#[test]
fn bucket_and_key_read_from_environment() {
    // An invalid master key fails validation, which only runs after the
    // bucket and key were accepted.
    let output = s3crypt(
        &["upload"],
        &[
            ("S3CRYPT_BUCKET", "demo-bucket"),
            ("S3CRYPT_OBJECT_KEY", "hello.txt"),
            ("S3CRYPT_MASTER_KEY", "not-base64"),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid encryption configuration"), "{stderr}");
    assert!(stderr.contains("demo-bucket"), "{stderr}");
}
