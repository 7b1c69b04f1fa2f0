use std::env;
use std::fs;
use std::path::Path;

use contracts::{KernelConfig, SessionDocument};
use drift_core::manifest::society_manifest;
use drift_core::{session, DriftKernel};

fn print_usage() {
    println!("drift-cli <command>");
    println!("commands:");
    println!("  manifest");
    println!("    lists every default in the startup manifest");
    println!("  demo [session_path]");
    println!("    runs a scripted read/rewrite session; optionally saves it as JSON");
    println!("  replay <session_path>");
    println!("    restores a saved session through the validated read/rewrite path");
}

fn build_kernel() -> Result<DriftKernel, String> {
    DriftKernel::new(&society_manifest(), KernelConfig::default())
        .map_err(|err| format!("invalid manifest: {err}"))
}

fn print_manifest() -> Result<(), String> {
    let kernel = build_kernel()?;
    for description in kernel.list_by_state(|_| true) {
        println!(
            "{:<24} {:<8} {:>5} -> {:<5} [{}]",
            description.key,
            description.category.to_string(),
            description.initial_value,
            description.target_value,
            description.state
        );
    }
    Ok(())
}

fn run_demo(session_path: Option<&String>) -> Result<(), String> {
    let mut kernel = build_kernel()?;
    let subscription = kernel.subscribe();

    println!("-- scan --");
    for summary in kernel.scan_area(&["timing_window", "coyote_time", "screen_shake"]) {
        println!("{:<16} {}", summary.key, summary.hint);
    }

    for key in ["timing_window", "coyote_time", "screen_shake"] {
        let description = kernel
            .read(key)
            .map_err(|err| format!("read failed: {err}"))?;
        println!(
            "read {:<16} current={} rigid={}",
            description.key, description.current_value, description.initial_value
        );
        kernel
            .rewrite(key)
            .map_err(|err| format!("rewrite failed: {err}"))?;
    }

    // Rewrite already happened; the late-join zone catches up instantly.
    let zone = kernel
        .register_zone("timing_window", 1.5)
        .map_err(|err| format!("zone registration failed: {err}"))?;
    kernel.sync_zone_to_current(zone);
    println!("zone {} scalar={}", zone, kernel.zone_scalar(zone).unwrap_or(0.0));

    // A zone registered before its key is rewritten decays over its duration.
    let fresh = kernel
        .register_zone("route_strictness", 1.5)
        .map_err(|err| format!("zone registration failed: {err}"))?;
    kernel
        .read("route_strictness")
        .map_err(|err| format!("read failed: {err}"))?;
    kernel
        .rewrite("route_strictness")
        .map_err(|err| format!("rewrite failed: {err}"))?;
    for _ in 0..3 {
        kernel.advance_zones(0.5);
        println!(
            "zone {} scalar={}",
            fresh,
            kernel.zone_scalar(fresh).unwrap_or(0.0)
        );
    }

    kernel.advance_chapter();

    println!("-- events --");
    for event in kernel.drain(&subscription) {
        let line = serde_json::to_string(&event.kind)
            .map_err(|err| format!("event serialization failed: {err}"))?;
        println!("{:>4} {line}", event.sequence);
    }

    println!("-- progress --");
    let progress = serde_json::to_string_pretty(&kernel.inspect_progress())
        .map_err(|err| format!("progress serialization failed: {err}"))?;
    println!("{progress}");

    if let Some(path) = session_path {
        let document = session::capture(&kernel);
        let serialized = serde_json::to_string_pretty(&document)
            .map_err(|err| format!("session serialization failed: {err}"))?;
        fs::write(Path::new(path), serialized)
            .map_err(|err| format!("failed to write {path}: {err}"))?;
        println!("session saved to {path}");
    }
    Ok(())
}

fn run_replay(session_path: Option<&String>) -> Result<(), String> {
    let path = session_path.ok_or_else(|| "missing session_path".to_string())?;
    let raw =
        fs::read_to_string(Path::new(path)).map_err(|err| format!("failed to read {path}: {err}"))?;
    let document: SessionDocument =
        serde_json::from_str(&raw).map_err(|err| format!("invalid session file: {err}"))?;

    let mut kernel = build_kernel()?;
    session::restore(&mut kernel, &document).map_err(|err| format!("replay failed: {err}"))?;

    println!(
        "replayed session_id={} rewritten={}/{} chapter={} phase={}",
        document.session_id,
        kernel.rewritten_count(),
        kernel.registry().len(),
        kernel.current_chapter(),
        kernel.phase()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let result = match command {
        Some("manifest") => print_manifest(),
        Some("demo") => run_demo(args.get(2)),
        Some("replay") => run_replay(args.get(2)),
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
