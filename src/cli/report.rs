use crate::engine::BoxSize;
use crate::harness::{
    average, chi_square_uniform, deviation, normalize,
    theoretical_curve, FrequencyTable, StatTester, TestKind, TesterConfig, TrialCount,
    DEFAULT_KEY_SIZE,
};
use crate::error::Result;
use serde::Serialize;

/// Rows shown in the persistence table of the text report
const SAMPLE_ROWS: usize = 16;

/// Options for the swap-test and random-test commands
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub kind: TestKind,
    pub count: TrialCount,
    pub key_size: usize,
    pub box_size: usize,
    /// Fixed seed for the trial-key generator; entropy when `None`
    pub seed: Option<u64>,
    pub json: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            kind: TestKind::default(),
            count: TrialCount::default(),
            key_size: DEFAULT_KEY_SIZE,
            box_size: BoxSize::default().get(),
            seed: None,
            json: false,
        }
    }
}

/// Numeric payload of one test run, ready for plotting.
///
/// `reference` is the flat `1/n` line for the randomness test and the
/// theoretical persistence curve for the swap test.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub kind: TestKind,
    pub count: u64,
    pub key_size: usize,
    pub box_size: usize,
    pub counts: FrequencyTable,
    pub normalized: Vec<f64>,
    pub reference: Vec<f64>,
}

pub fn run_test(options: &TestOptions) -> Result<TestReport> {
    let box_size = BoxSize::new(options.box_size)?;
    let config = TesterConfig {
        key_size: options.key_size,
        box_size,
    };

    let counts = match options.seed {
        Some(seed) => StatTester::seeded(config, seed)?.run_trial(options.kind, options.count),
        None => StatTester::new(config)?.run_trial(options.kind, options.count),
    };

    let normalized = normalize(counts.counts(), options.count);
    let reference = match options.kind {
        TestKind::Randomness => vec![1.0 / box_size.get() as f64; box_size.get()],
        TestKind::SwapPersistence => theoretical_curve(box_size),
    };

    Ok(TestReport {
        kind: options.kind,
        count: options.count.get(),
        key_size: options.key_size,
        box_size: box_size.get(),
        counts,
        normalized,
        reference,
    })
}

/// Run a test and render it as text, or as JSON when `options.json` is set.
pub fn show_test(options: &TestOptions) -> Result<String> {
    let report = run_test(options)?;
    if options.json {
        render_json(&report)
    } else {
        Ok(render_text(&report))
    }
}

pub fn render_json(report: &TestReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_text(report: &TestReport) -> String {
    let mut output = String::new();

    let title = match report.kind {
        TestKind::Randomness => "RC4 Keystream Randomness Test",
        TestKind::SwapPersistence => "RC4 Swap Persistence Test",
    };
    output.push_str(&format!("{}\n", title));
    output.push_str(&format!("{}\n\n", "=".repeat(title.len())));
    output.push_str(&format!("Trials: {}\n", report.count));
    output.push_str(&format!("Key size: {} bytes\n", report.key_size));
    output.push_str(&format!("Box size: {}\n\n", report.box_size));

    match report.kind {
        TestKind::Randomness => append_randomness(&mut output, report),
        TestKind::SwapPersistence => append_persistence(&mut output, report),
    }

    output
}

fn append_randomness(output: &mut String, report: &TestReport) {
    if let Some(avg) = average(&report.normalized) {
        output.push_str(&format!("Average frequency: {:.6}\n", avg.obtained));
        output.push_str(&format!("  Expected:        {:.6}\n\n", avg.expected));
    }

    if let Some(chi) = chi_square_uniform(report.counts.counts()) {
        output.push_str(&format!(
            "Chi-Square: {:.2} (df={})\n",
            chi.statistic, chi.degrees_of_freedom
        ));
        output.push_str(&format!("  P-value: {}\n", chi.p_value_label()));
        output.push_str(&format!(
            "  Interpretation: {}\n\n",
            chi.verdict()
        ));
    }

    let counts = report.counts.counts();
    let most = counts.iter().enumerate().max_by_key(|&(_, c)| *c);
    let least = counts.iter().enumerate().min_by_key(|&(_, c)| *c);
    if let (Some((most_idx, most_count)), Some((least_idx, least_count))) = (most, least) {
        output.push_str("Output Frequency:\n");
        output.push_str(&format!(
            "  Most common:  {} ({} times)\n",
            most_idx, most_count
        ));
        output.push_str(&format!(
            "  Least common: {} ({} times)\n",
            least_idx, least_count
        ));
    }
}

fn append_persistence(output: &mut String, report: &TestReport) {
    output.push_str("Index   Empirical   Theoretical\n");
    output.push_str("-----   ---------   -----------\n");
    for idx in sample_indices(report.box_size) {
        output.push_str(&format!(
            "{:>5}   {:>9.4}   {:>11.4}\n",
            idx, report.normalized[idx], report.reference[idx]
        ));
    }
    output.push('\n');

    if let Some(dev) = deviation(&report.normalized, &report.reference) {
        output.push_str(&format!(
            "Max deviation: {:.4} at index {}\n",
            dev.max_abs, dev.max_index
        ));
        output.push_str(&format!("Mean deviation: {:.4}\n", dev.mean_abs));
    }
}

/// Evenly spaced indices across `0..n`, always including the last one.
fn sample_indices(n: usize) -> Vec<usize> {
    let step = n.div_ceil(SAMPLE_ROWS).max(1);
    let mut indices: Vec<usize> = (0..n).step_by(step).collect();
    if let Some(&last) = indices.last() {
        if last != n - 1 {
            indices.push(n - 1);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(kind: TestKind, count: u64, box_size: usize) -> TestOptions {
        TestOptions {
            kind,
            count: TrialCount::new(count).unwrap(),
            box_size,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(4), vec![0, 1, 2, 3]);
        let indices = sample_indices(256);
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&255));
        assert!(indices.len() <= SAMPLE_ROWS + 1);
    }

    #[test]
    fn test_randomness_report() {
        let report = run_test(&options(TestKind::Randomness, 4096, 256)).unwrap();
        assert_eq!(report.counts.total(), 4096);
        assert_eq!(report.normalized.len(), 256);
        assert!(report.reference.iter().all(|&r| r == 1.0 / 256.0));

        let text = render_text(&report);
        assert!(text.contains("RC4 Keystream Randomness Test"));
        assert!(text.contains("Chi-Square"));
        assert!(text.contains("Expected:        0.003906"));
    }

    #[test]
    fn test_persistence_report() {
        let report = run_test(&options(TestKind::SwapPersistence, 200, 32)).unwrap();
        assert_eq!(report.counts.len(), 32);
        assert_eq!(report.counts.get(31), Some(200));
        assert_eq!(report.normalized[31], 1.0);
        assert_eq!(report.reference, theoretical_curve(BoxSize::new(32).unwrap()));

        let text = render_text(&report);
        assert!(text.contains("RC4 Swap Persistence Test"));
        assert!(text.contains("Max deviation"));
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let opts = options(TestKind::SwapPersistence, 50, 64);
        let first = run_test(&opts).unwrap();
        let second = run_test(&opts).unwrap();
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_json_payload() {
        let mut opts = options(TestKind::Randomness, 100, 16);
        opts.json = true;
        let json = show_test(&opts).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "randomness");
        assert_eq!(value["count"], 100);
        assert_eq!(value["counts"].as_array().unwrap().len(), 16);
        assert_eq!(value["reference"].as_array().unwrap().len(), 16);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(run_test(&options(TestKind::Randomness, 10, 0)).is_err());
        let mut opts = options(TestKind::Randomness, 10, 16);
        opts.key_size = 0;
        assert!(run_test(&opts).is_err());
    }
}
