#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::indexing_slicing)]

use chainmap::{HashTable, MIN_SIZE};
use log::info;
use plotters::prelude::*;
use rand::{Rng, seq::SliceRandom};

// Number of random keys inserted, then removed again
const KEY_COUNT: usize = 5_000;

/// Table shape after one operation
#[derive(Debug, Clone, Copy)]
struct Sample {
    bucket_count: usize,
    occupied: usize,
    len: usize,
}

impl Sample {
    fn of(table: &HashTable<usize>) -> Self {
        Self {
            bucket_count: table.bucket_count(),
            occupied: table.occupied_buckets(),
            len: table.len(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut rng = rand::rng();
    let mut keys: Vec<String> =
        (0..KEY_COUNT).map(|_| format!("key-{:016x}", rng.random::<u64>())).collect();

    let mut table = HashTable::new();
    let mut samples = Vec::with_capacity(KEY_COUNT * 2 + 1);
    samples.push(Sample::of(&table));

    for (value, key) in keys.iter().enumerate() {
        table.set(key, value)?;
        samples.push(Sample::of(&table));
    }

    let peak = Sample::of(&table);
    let chain_lengths = table.chain_lengths();
    info!(
        "after {} inserts: {} entries in {} buckets, {} occupied (load factor {:.3})",
        KEY_COUNT,
        peak.len,
        peak.bucket_count,
        peak.occupied,
        table.load_factor()
    );

    keys.shuffle(&mut rng);
    for key in &keys {
        table.remove(key)?;
        samples.push(Sample::of(&table));
    }
    info!("after removing every key: {} buckets", table.bucket_count());

    draw_capacity(&samples)?;
    draw_chain_histogram(&chain_lengths)?;

    info!("Generated plot images: bucket_capacity.png, chain_lengths.png");
    Ok(())
}

fn draw_capacity(samples: &[Sample]) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let root = BitMapBackend::new("bucket_capacity.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = samples
        .iter()
        .map(|sample| sample.bucket_count.max(sample.len))
        .max()
        .unwrap_or(MIN_SIZE) as f64 *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Bucket Array Growth and Shrink", (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..samples.len(), 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Operation (inserts, then removals)")
        .y_desc("Count")
        .axis_desc_style((font_family, 16))
        .draw()?;

    let series: [(&str, RGBColor, fn(&Sample) -> usize); 3] = [
        ("Bucket count", RGBColor(220, 50, 50), |sample| sample.bucket_count),
        ("Occupied buckets", RGBColor(50, 90, 220), |sample| sample.occupied),
        ("Entries", RGBColor(50, 180, 50), |sample| sample.len),
    ];

    for (label, color, metric) in series {
        let style = ShapeStyle::from(&color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                samples.iter().enumerate().map(|(step, sample)| (step, metric(sample) as f64)),
                style,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_chain_histogram(chain_lengths: &[usize]) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let longest = chain_lengths.iter().copied().max().unwrap_or(0);

    let mut buckets_by_length = vec![0_usize; longest + 1];
    for &length in chain_lengths {
        buckets_by_length[length] += 1;
    }
    let max_count = buckets_by_length.iter().copied().max().unwrap_or(0) as f64 * 1.1;

    let root = BitMapBackend::new("chain_lengths.png", (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Chain Length Distribution at Peak Size", (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..(longest + 1), 0.0..max_count.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Chain length")
        .y_desc("Buckets")
        .axis_desc_style((font_family, 16))
        .draw()?;

    let bar_color = RGBColor(180, 50, 180);
    chart.draw_series(buckets_by_length.iter().enumerate().map(|(length, &count)| {
        Rectangle::new([(length, 0.0), (length + 1, count as f64)], bar_color.filled())
    }))?;

    root.present()?;
    Ok(())
}
