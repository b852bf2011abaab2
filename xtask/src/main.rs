use camino::{Utf8Path, Utf8PathBuf};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use sketchsnap::preprocess::templates::template;
use sketchsnap::preprocess::{
    AugmentConfig, DatasetConfig, RasterConfig, TrainingDataset, augment, rasterize, simulate_hand,
};
use sketchsnap::recognize::{ShapeModel, StrokeMetrics, TemplateModel};
use sketchsnap::{GeometricRecognizer, Point, RecognitionResult, ShapeLabel};
use std::fs;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let opts = Options::parse(&args[2..]);
    match args[1].as_str() {
        "gen-dataset" => gen_dataset(&opts),
        "eval" => eval(&opts),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            usage();
            std::process::exit(1);
        }
    }
}

fn usage() {
    eprintln!("Usage: cargo xtask <command> [--samples N] [--seed N] [--size N] [--out PATH]");
    eprintln!("Commands:");
    eprintln!("  gen-dataset    Generate a synthetic training dataset as JSON");
    eprintln!("  eval           Score the geometric and template recognizers on synthetic strokes");
}

struct Options {
    samples: usize,
    seed: u64,
    size: usize,
    out: Option<Utf8PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> Self {
        let mut opts = Options {
            samples: 200,
            seed: 42,
            size: sketchsnap::preprocess::CLASSIFIER_INPUT_SIZE,
            out: None,
        };
        let mut it = args.iter();
        while let Some(flag) = it.next() {
            let Some(value) = it.next() else {
                eprintln!("Missing value for {flag}");
                std::process::exit(1);
            };
            match flag.as_str() {
                "--samples" => opts.samples = parse_number(flag, value),
                "--seed" => opts.seed = parse_number(flag, value),
                "--size" => opts.size = parse_number(flag, value),
                "--out" => opts.out = Some(Utf8PathBuf::from(value)),
                _ => {
                    eprintln!("Unknown option: {flag}");
                    std::process::exit(1);
                }
            }
        }
        opts
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {flag}: {value}");
        std::process::exit(1);
    })
}

fn workspace_root() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

fn dataset_config(opts: &Options) -> DatasetConfig {
    DatasetConfig {
        samples_per_class: opts.samples,
        raster: RasterConfig::with_size(opts.size),
        ..DatasetConfig::default()
    }
}

fn gen_dataset(opts: &Options) {
    let config = dataset_config(opts);
    let output_path = opts
        .out
        .clone()
        .unwrap_or_else(|| workspace_root().join("target/shapes-dataset.json"));

    // One independently seeded generator per class so classes build in parallel
    let parts: Vec<TrainingDataset> = config
        .classes
        .par_iter()
        .enumerate()
        .map(|(i, &label)| {
            eprintln!("Generating {} x {}...", config.samples_per_class, label);
            let class_config = DatasetConfig {
                classes: vec![label],
                ..config.clone()
            };
            let mut rng = StdRng::seed_from_u64(opts.seed.wrapping_add(i as u64));
            TrainingDataset::generate(&class_config, &mut rng)
        })
        .collect();

    let mut dataset = TrainingDataset {
        inputs: Vec::new(),
        labels: Vec::new(),
        shape_names: config.classes.clone(),
    };
    for (class_idx, part) in parts.into_iter().enumerate() {
        dataset.labels.extend(std::iter::repeat_n(class_idx, part.len()));
        dataset.inputs.extend(part.inputs);
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create output directory");
    }
    let json = serde_json::to_vec(&dataset).expect("Failed to serialize dataset");
    fs::write(&output_path, json).expect("Failed to write dataset");
    println!(
        "Wrote {} samples over {} classes to {}",
        dataset.len(),
        dataset.shape_names.len(),
        output_path
    );
}

/// Per-class evaluation row
struct ClassReport {
    label: ShapeLabel,
    samples: usize,
    template_correct: usize,
    /// How often the geometric recognizer answered each of its labels
    geometric: Vec<(ShapeLabel, usize)>,
    mean_metrics: [f64; 3],
}

fn eval(opts: &Options) {
    eprintln!("Fitting template model on {} samples per class...", opts.samples);
    let training = TrainingDataset::generate(&dataset_config(opts), &mut StdRng::seed_from_u64(opts.seed));
    let model = TemplateModel::fit(&training, TemplateModel::DEFAULT_TEMPERATURE).expect("Failed to fit template model");
    let geometric = GeometricRecognizer::default();

    let reports: Vec<ClassReport> = ShapeLabel::CLASSIFIER_VOCABULARY[..]
        .par_iter()
        .enumerate()
        .map(|(i, &label)| {
            // Held-out seeds, disjoint from the training generator
            let mut rng = StdRng::seed_from_u64(opts.seed.wrapping_mul(31).wrapping_add(1000 + i as u64));
            evaluate_class(label, opts.samples, &model, &geometric, &mut rng)
        })
        .collect();

    println!(
        "{:<12} {:>7} {:>9}  {:>6} {:>6} {:>6}  geometric answers",
        "class", "samples", "template", "lin", "circ", "rect"
    );
    let mut correct = 0;
    let mut total = 0;
    for r in &reports {
        correct += r.template_correct;
        total += r.samples;
        let answers: Vec<String> = r.geometric.iter().map(|(l, n)| format!("{l}={n}")).collect();
        println!(
            "{:<12} {:>7} {:>8.1}%  {:>6.3} {:>6.3} {:>6.3}  {}",
            r.label.as_str(),
            r.samples,
            percent(r.template_correct, r.samples),
            r.mean_metrics[0],
            r.mean_metrics[1],
            r.mean_metrics[2],
            answers.join(" ")
        );
    }
    println!("template accuracy: {:.1}% over {} strokes", percent(correct, total), total);

    if let Some(out) = &opts.out {
        let summary: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "label": r.label,
                    "samples": r.samples,
                    "template_correct": r.template_correct,
                    "geometric": r.geometric.iter().map(|(l, n)| (l.as_str(), *n)).collect::<std::collections::BTreeMap<_, _>>(),
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&summary).expect("Failed to serialize report");
        fs::write(out, json).expect("Failed to write report");
        println!("Wrote report to {out}");
    }
}

fn evaluate_class(
    label: ShapeLabel,
    samples: usize,
    model: &TemplateModel,
    geometric: &GeometricRecognizer,
    rng: &mut StdRng,
) -> ClassReport {
    let augment_config = AugmentConfig::for_label(label);
    let geometric_labels = [
        ShapeLabel::Line,
        ShapeLabel::Circle,
        ShapeLabel::Rectangle,
        ShapeLabel::Diamond,
        ShapeLabel::Unknown,
    ];
    let mut geometric_counts = vec![0usize; geometric_labels.len()];
    let mut template_correct = 0;
    let mut metric_sums = [0.0; 3];
    let mut measured = 0;
    let mut evaluated = 0;

    for _ in 0..samples {
        let Some(base) = template(label, rng) else {
            break;
        };
        let hand = simulate_hand(&base, label, rng);
        let stroke: Vec<Point> = augment(&hand, &augment_config, rng);
        evaluated += 1;

        let grid = rasterize(&stroke, model.input_size());
        let predicted = match model.predict(&grid) {
            Ok(probs) => RecognitionResult::from_distribution(model.labels(), &probs),
            Err(_) => RecognitionResult::unknown(),
        };
        if predicted.name == label {
            template_correct += 1;
        }

        let geo = geometric.recognize(&stroke);
        if let Some(idx) = geometric_labels.iter().position(|&l| l == geo.name) {
            geometric_counts[idx] += 1;
        }
        if let Some(m) = StrokeMetrics::measure(&stroke) {
            metric_sums[0] += m.linearity;
            metric_sums[1] += m.circularity;
            metric_sums[2] += m.rectangularity;
            measured += 1;
        }
    }

    ClassReport {
        label,
        samples: evaluated,
        template_correct,
        geometric: geometric_labels
            .into_iter()
            .zip(geometric_counts)
            .filter(|&(_, n)| n > 0)
            .collect(),
        mean_metrics: metric_sums.map(|s| if measured > 0 { s / measured as f64 } else { 0.0 }),
    }
}

fn percent(n: usize, total: usize) -> f64 {
    if total > 0 {
        (n as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
