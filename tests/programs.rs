use std::fs;

use obstruct::{Config, run_captured};
use walkdir::WalkDir;

/// Runs every `demos/*.obs` program and compares its output with the
/// `.stdout` file next to it. A `.stdin` file, when present, is fed to the
/// program as input.
#[test]
fn demo_programs_produce_their_recorded_output() {
    let mut count = 0;

    for entry in WalkDir::new("demos").into_iter()
                                      .filter_map(Result::ok)
                                      .filter(|e| e.path().extension().is_some_and(|ext| ext == "obs"))
    {
        let path = entry.path();
        let source = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let expected = fs::read_to_string(path.with_extension("stdout")).unwrap_or_else(|e| {
                                                                             panic!("Missing output for {path:?}: {e}")
                                                                         });
        let input = fs::read_to_string(path.with_extension("stdin")).unwrap_or_default();

        count += 1;
        let config = Config::default().with_args(vec![path.display().to_string()])
                                      .with_frame_limit(Some(5));
        let captured = run_captured(&source, &input, &config);
        if let Err(e) = &captured.result {
            panic!("Demo {path:?} failed: {e}\nOutput so far:\n{}", captured.stdout);
        }
        assert_eq!(captured.stdout, expected, "output of {path:?}");
    }

    assert!(count > 0, "No demo programs found in demos/");
}
