// support.rs - Sequence-alignment-based triangle support testing

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A triangle of linked sequences, resolved to ids and edge distances
///
/// `distances[0]` belongs to the edge (ids[0], ids[1]), `distances[1]` to
/// (ids[1], ids[2]) and `distances[2]` to (ids[2], ids[0]).
#[derive(Debug, Clone)]
pub struct SequenceTriangle {
    pub ids: [String; 3],
    pub distances: [f64; 3],
}

/// Per-triangle verdict, aligned with the triangle's edge order
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleVerdict {
    pub unsupported: [bool; 3],
}

/// Trait for pluggable sequence-based edge-support tests
pub trait SupportTester {
    fn name(&self) -> &'static str;

    /// Judge every triangle against the alignment, one verdict per triangle
    fn test(
        &self,
        alignment: &Path,
        triangles: &[SequenceTriangle],
    ) -> Result<Vec<TriangleVerdict>, String>;
}

/// Triangle-consistency test over normalized alignment mismatch distances
///
/// For each triangle the three pairwise distances are recomputed from the
/// alignment; the longest edge is judged unsupported when it exceeds the sum of
/// the other two beyond the configured slack.
pub struct AlignmentSupportTester {
    slack: f64,
}

impl AlignmentSupportTester {
    pub fn new() -> Self {
        Self { slack: 1e-9 }
    }

    pub fn with_slack(slack: f64) -> Self {
        Self { slack }
    }

    fn load_alignment(path: &Path) -> Result<HashMap<String, Vec<u8>>, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open alignment '{}' for reading: {}", path.display(), e))?;

        let mut sequences: HashMap<String, Vec<u8>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in BufReader::new(file).lines() {
            let line =
                line.map_err(|e| format!("Failed to read alignment '{}': {}", path.display(), e))?;
            if let Some(id) = line.strip_prefix('>') {
                let id = id.trim().to_string();
                sequences.entry(id.clone()).or_default();
                current = Some(id);
            } else if let Some(id) = &current {
                let sequence = sequences.get_mut(id).expect("current id always inserted");
                sequence.extend(line.trim().bytes().map(|b| b.to_ascii_uppercase()));
            }
        }

        Ok(sequences)
    }

    /// Normalized mismatch fraction over positions where neither sequence gaps
    fn pairwise_distance(a: &[u8], b: &[u8]) -> f64 {
        let mut compared = 0usize;
        let mut mismatches = 0usize;
        for (&x, &y) in a.iter().zip(b.iter()) {
            if x == b'-' || y == b'-' || x == b'N' || y == b'N' {
                continue;
            }
            compared += 1;
            if x != y {
                mismatches += 1;
            }
        }
        if compared == 0 {
            0.0
        } else {
            mismatches as f64 / compared as f64
        }
    }
}

impl Default for AlignmentSupportTester {
    fn default() -> Self {
        Self::new()
    }
}

impl SupportTester for AlignmentSupportTester {
    fn name(&self) -> &'static str {
        "alignment-triangle"
    }

    fn test(
        &self,
        alignment: &Path,
        triangles: &[SequenceTriangle],
    ) -> Result<Vec<TriangleVerdict>, String> {
        let sequences = Self::load_alignment(alignment)?;

        let mut verdicts = Vec::with_capacity(triangles.len());
        for triangle in triangles {
            let mut measured = [0.0f64; 3];
            for side in 0..3 {
                let id_a = &triangle.ids[side];
                let id_b = &triangle.ids[(side + 1) % 3];
                let seq_a = sequences
                    .get(id_a)
                    .ok_or_else(|| format!("Sequence '{}' missing from alignment", id_a))?;
                let seq_b = sequences
                    .get(id_b)
                    .ok_or_else(|| format!("Sequence '{}' missing from alignment", id_b))?;
                measured[side] = Self::pairwise_distance(seq_a, seq_b);
            }

            let mut verdict = TriangleVerdict::default();
            let longest = (0..3)
                .max_by(|&i, &j| measured[i].partial_cmp(&measured[j]).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or(0);
            let others = measured[(longest + 1) % 3] + measured[(longest + 2) % 3];
            if measured[longest] > others + self.slack {
                verdict.unsupported[longest] = true;
            }
            verdicts.push(verdict);
        }

        Ok(verdicts)
    }
}

/// Scripted tester: each call pops the next list of unsupported node pairs
#[cfg(test)]
pub struct ScriptedTester {
    passes: std::cell::RefCell<std::collections::VecDeque<Vec<(String, String)>>>,
}

#[cfg(test)]
impl ScriptedTester {
    pub fn new(passes: Vec<Vec<(&str, &str)>>) -> Self {
        let passes = passes
            .into_iter()
            .map(|pass| {
                pass.into_iter()
                    .map(|(a, b)| (a.to_string(), b.to_string()))
                    .collect()
            })
            .collect();
        Self {
            passes: std::cell::RefCell::new(passes),
        }
    }
}

#[cfg(test)]
impl SupportTester for ScriptedTester {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn test(
        &self,
        _alignment: &Path,
        triangles: &[SequenceTriangle],
    ) -> Result<Vec<TriangleVerdict>, String> {
        let pairs = self.passes.borrow_mut().pop_front().unwrap_or_default();
        let hit = |a: &str, b: &str| {
            pairs
                .iter()
                .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
        };
        Ok(triangles
            .iter()
            .map(|t| {
                let mut verdict = TriangleVerdict::default();
                for side in 0..3 {
                    verdict.unsupported[side] = hit(&t.ids[side], &t.ids[(side + 1) % 3]);
                }
                verdict
            })
            .collect())
    }
}
