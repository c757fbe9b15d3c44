// Cantor engine CLI entry point.
//
// Voices a chord progression read from a JSON file, prints each voicing by
// note name, analyzes the resulting block-chord lines for counterpoint
// problems, and optionally writes the voiced progression to MIDI.
//
// Usage:
//   cargo run -p cantor_engine -- <progression.json> [--midi out.mid] [--tempo BPM]
//
// Set RUST_LOG=cantor_engine=debug to trace each voiced chord.

use cantor_engine::midi::write_midi;
use cantor_engine::progression::Progression;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input) = args.get(1).filter(|s| !s.starts_with("--")) else {
        eprintln!("usage: cantor <progression.json> [--midi out.mid] [--tempo BPM]");
        std::process::exit(2);
    };

    if let Err(e) = run(&args, input) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String], input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let midi_path: Option<String> = parse_flag(args, "--midi");
    let tempo: u16 = parse_flag(args, "--tempo").unwrap_or(72);

    info!(path = input, "loading progression");
    let progression = Progression::load(Path::new(input))?;
    println!("=== Cantor ===");
    println!("Progression: {} ({} chords)", input, progression.chords.len());
    println!(
        "Voices: {}, style: {:?}, {} beats per chord",
        progression.voicing.voice_count.count(),
        progression.voicing.style,
        progression.beats_per_chord
    );
    println!();

    let rendered = progression.render()?;

    println!("[1/3] Voicings");
    for (i, (chord, voicing)) in progression.chords.iter().zip(&rendered.voicings).enumerate() {
        let root = chord.resolve_root()?;
        let named = voicing.named();
        let parts: Vec<String> = named
            .iter()
            .map(|(part, name)| format!("{}={}", part.slug(), name))
            .collect();
        println!("  {:>2}. {}{:?}  {}", i + 1, root, chord.quality, parts.join(" "));
        for (lower, upper) in &voicing.unresolved {
            println!("      ! {} could not be placed below {}", lower, upper);
        }
    }
    println!();

    println!("[2/3] Analysis");
    if rendered.analysis.violations.is_empty() {
        println!("  No violations.");
    }
    for v in &rendered.analysis.violations {
        println!("  {}", v);
        println!("      {}", v.suggestion);
    }
    let summary = &rendered.analysis.summary;
    println!(
        "  Score: {} ({})",
        summary.score,
        if summary.is_valid { "valid" } else { "has errors" }
    );
    for (kind, count) in &summary.counts_by_type {
        println!("    {}: {}", kind, count);
    }
    println!();

    match midi_path {
        Some(path) => {
            println!("[3/3] Writing MIDI to {}...", path);
            write_midi(&rendered.voicings, progression.beats_per_chord, tempo, Path::new(&path))?;
            let beats = rendered.voicings.len() as f64 * progression.beats_per_chord;
            println!("  Done! Duration: {:.0}s at {} BPM", beats * 60.0 / tempo.max(1) as f64, tempo);
        }
        None => println!("[3/3] No --midi path given, skipping MIDI output."),
    }

    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
