use crate::image_classifier::interface::Classification;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Metadata {
    labels: Vec<String>,
}

/// WordNet ids such as `n02123045`.
fn is_synset_id(token: &str) -> bool {
    token.len() == 9 && token.starts_with('n') && token[1..].chars().all(|c| c.is_ascii_digit())
}

/// `n02123045 tabby, tabby cat` becomes `tabby`. Other lines are kept as is.
fn clean_label(line: &str) -> String {
    match line.split_once(' ') {
        Some((id, names)) if is_synset_id(id) => names
            .split(',')
            .next()
            .unwrap_or(names)
            .trim()
            .to_string(),
        _ => line.to_string(),
    }
}

/// Accepts a JSON document with a `labels` array or plain text with one
/// label per line, optionally prefixed by a synset id.
pub fn parse_labels(body: &str) -> Vec<String> {
    if let Ok(metadata) = serde_json::from_str::<Metadata>(body) {
        return metadata.labels;
    }

    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(clean_label)
        .collect()
}

fn looks_like_probabilities(scores: &[f32]) -> bool {
    let total: f32 = scores.iter().sum();
    scores.iter().all(|s| (0.0..=1.0).contains(s)) && (total - 1.0).abs() < 0.01
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

/// One classification per output score, in output order. Raw logits are
/// turned into probabilities first.
pub fn scores_to_classifications(scores: &[f32], labels: &[String]) -> Vec<Classification> {
    let probabilities = if looks_like_probabilities(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    probabilities
        .into_iter()
        .enumerate()
        .map(|(index, confidence)| Classification {
            label: labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("class {}", index)),
            confidence,
        })
        .collect()
}
