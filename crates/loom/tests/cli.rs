use loom_test_utils::sandbox::Sandbox;

const HARNESS_A: &str = r#"
connectors:
  X1:
    type: Molex KK 254
    pincount: 4
  X2:
    type: Molex KK 254
    pincount: 4
cables:
  W1:
    wirecount: 4
    color_code: DIN
    gauge: 0.25 mm2
    length: 0.5
connections:
  - - X1: [1-4]
    - W1: [1-4]
    - X2: [1-4]
"#;

const HARNESS_B: &str = r#"
connectors:
  X1:
    type: Molex KK 254
    pincount: 4
  F:
    style: simple
    autogenerate: true
    type: Crimp ferrule
cables:
  W1:
    wirecount: 2
    color_code: DIN
    gauge: 0.25 mm2
    length: 1.5
connections:
  - - X1: [1, 2]
    - W1: [1, 2]
    - F
"#;

#[test]
fn test_build_writes_diagram_and_bom() {
    let mut sb = Sandbox::new();
    sb.write("harness.yml", HARNESS_A);
    sb.run_ok("loom", ["build", "harness.yml", "-o", "out"]);

    let dot = sb.read("out/harness.gv");
    assert!(dot.starts_with("graph {"));
    assert!(dot.contains("rankdir=\"LR\""));
    assert!(dot.contains("\"X1\":p1r:e -- \"W1\":w1:w"));
    assert!(dot.contains("\"W1\":w4:e -- \"X2\":p4l:w"));

    let tsv = sb.read("out/harness.bom.tsv");
    let mut lines = tsv.lines();
    assert_eq!(lines.next(), Some("Id\tDescription\tQty\tUnit\tDesignators"));
    assert!(tsv.contains("Connector, Molex KK 254, 4 pins\t2\t\tX1, X2"));
    assert!(tsv.contains("\t0.5\tm\tW1"));
    assert!(!sb.exists("out/bom.tsv"));
}

#[test]
fn test_build_several_files_writes_shared_bom() {
    let mut sb = Sandbox::new();
    sb.write("a.yml", HARNESS_A).write("b.yml", HARNESS_B);
    sb.run_ok("loom", ["build", "a.yml", "b.yml", "-o", "out"]);

    assert!(sb.exists("out/a.gv"));
    assert!(sb.exists("out/b.bom.tsv"));
    let shared = sb.read("out/bom.tsv");
    let header = shared.lines().next().unwrap();
    assert!(header.ends_with("Qty (a)\tQty (b)"));
    // X1 of both harnesses share one line
    assert!(shared.contains("Connector, Molex KK 254, 4 pins\t3\t\tX1, X2\t2\t1"));
}

#[test]
fn test_bom_formats() {
    let mut sb = Sandbox::new();
    sb.write("harness.yml", HARNESS_A);

    let tsv = sb.run_ok("loom", ["bom", "harness.yml", "--format", "tsv"]);
    assert!(tsv.starts_with("Id\tDescription"));

    let json = sb.run_ok("loom", ["bom", "harness.yml", "--format", "json"]);
    assert!(json.trim_start().starts_with('['));
    assert!(json.contains("\"description\": \"Connector, Molex KK 254, 4 pins\""));

    let table = sb.run_ok("loom", ["bom", "harness.yml"]);
    assert!(table.contains("Description"));
    assert!(table.contains("X1, X2"));
}

#[test]
fn test_invalid_harness_reports_file_and_cause() {
    let mut sb = Sandbox::new();
    sb.write(
        "broken.yml",
        r#"
connectors:
  X1: { pincount: 8 }
cables:
  W1: { wirecount: 1 }
connections:
  - - X1: 9
    - W1: 1
"#,
    );
    let output = sb
        .run("loom", ["build", "broken.yml"])
        .stderr_capture()
        .stdout_capture()
        .unchecked()
        .run()
        .expect("loom should execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("broken.yml"));
    assert!(stderr.contains("X1:9 not found"));
}

#[test]
fn test_missing_file() {
    let sb = Sandbox::new();
    let output = sb
        .run("loom", ["bom", "nope.yml"])
        .stderr_capture()
        .unchecked()
        .run()
        .expect("loom should execute");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read nope.yml"));
}
