//! Throwaway working directory for driving the `loom` binary in tests.
//!
//! Everything lives under an `assert_fs::TempDir` and is cleaned up on drop.
//!
//! ```no_run
//! use loom_test_utils::sandbox::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("harness.yml", "connectors: {}\n");
//! let out = sb.run_ok("loom", ["bom", "harness.yml", "--format", "tsv"]);
//! assert!(out.starts_with("Id\t"));
//! ```

use assert_fs::TempDir;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

pub struct Sandbox {
    root: TempDir,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        Self { root }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        let p = self.root_path().join(rel);
        fs::read_to_string(&p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()))
    }

    pub fn exists<P: AsRef<Path>>(&self, rel: P) -> bool {
        self.root_path().join(rel).exists()
    }

    /// Build a `duct::Expression` for a cargo binary, pre-wired with the
    /// sandbox env and run from the sandbox root. Chain `.unchecked()`, `.stderr_capture()`
    /// etc. and finish with `.run()` or `.read()`.
    pub fn run<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program);
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let expr = duct::cmd(cargo_bin_path, args).dir(self.root_path());
        self.inject_env(expr)
    }

    /// Run a cargo binary and return its stdout, panicking on a non-zero exit.
    pub fn run_ok<I>(&self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.run(program, args)
            .read()
            .unwrap_or_else(|e| panic!("{program} failed: {e}"))
    }

    pub fn inject_env(&self, expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        // colored output would end up in captured stderr
        env_map.insert("NO_COLOR".into(), "1".into());
        env_map.insert("RUST_LOG".into(), "error".into());
        expr.full_env(&env_map)
    }
}
