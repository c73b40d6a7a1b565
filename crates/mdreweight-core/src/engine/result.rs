use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Mean and sample standard deviation of one per-frame series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    /// `None` for an empty series.
    pub mean: Option<f64>,
    /// Sample standard deviation (`n - 1` denominator); `None` with fewer than two frames.
    pub std: Option<f64>,
}

impl SeriesSummary {
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                mean: None,
                std: None,
            };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        });
        Self {
            mean: Some(mean),
            std,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    pub probability: SeriesSummary,
    pub relative_probability: SeriesSummary,
    pub energy: SeriesSummary,
}

#[derive(Serialize)]
struct FrameRecord {
    frame: usize,
    energy: f64,
    relative_probability: f64,
    probability: f64,
}

/// Per-frame perturbation energies and the frame weights they imply.
///
/// All three series have one entry per processed frame, in frame order:
///
/// - `energy[i]` is the perturbation energy of frame `i`,
/// - `relative_probability[i] = exp(-energy[i] / (k * T))`,
/// - `probability[i] = relative_probability[i] / sum(relative_probability)`.
///
/// The result is built once by the reweighting driver and cannot be modified.
#[derive(Debug, Clone, PartialEq)]
pub struct ReweightResult {
    probability: Vec<f64>,
    relative_probability: Vec<f64>,
    energy: Vec<f64>,
}

impl ReweightResult {
    /// Builds the weights for an energy series at thermal energy `kt`.
    ///
    /// Probabilities are normalized after subtracting the lowest finite energy, which leaves
    /// them unchanged mathematically but keeps the sum from underflowing when all energies
    /// are large. Non-finite energies are propagated as they are.
    pub(crate) fn from_energies(energy: Vec<f64>, kt: f64) -> Self {
        let relative_probability: Vec<f64> = energy.iter().map(|&e| (-e / kt).exp()).collect();

        let lowest = energy
            .iter()
            .copied()
            .filter(|e| e.is_finite())
            .fold(f64::INFINITY, f64::min);
        let shift = if lowest.is_finite() { lowest } else { 0.0 };
        let shifted: Vec<f64> = energy.iter().map(|&e| (-(e - shift) / kt).exp()).collect();
        let total: f64 = shifted.iter().sum();
        let probability = shifted.into_iter().map(|w| w / total).collect();

        Self {
            probability,
            relative_probability,
            energy,
        }
    }

    pub fn probability(&self) -> &[f64] {
        &self.probability
    }

    pub fn relative_probability(&self) -> &[f64] {
        &self.relative_probability
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            probability: SeriesSummary::of(&self.probability),
            relative_probability: SeriesSummary::of(&self.relative_probability),
            energy: SeriesSummary::of(&self.energy),
        }
    }

    /// Kish effective sample size `1 / sum(p_i^2)`: `n` for uniform weights, `1` when a
    /// single frame carries all the weight. `None` for an empty result.
    pub fn effective_sample_size(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let squares: f64 = self.probability.iter().map(|p| p * p).sum();
        Some(1.0 / squares)
    }

    /// Writes one `frame,energy,relative_probability,probability` row per frame.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (frame, ((&energy, &relative_probability), &probability)) in self
            .energy
            .iter()
            .zip(&self.relative_probability)
            .zip(&self.probability)
            .enumerate()
        {
            csv_writer.serialize(FrameRecord {
                frame,
                energy,
                relative_probability,
                probability,
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    label: &str,
    summary: &SeriesSummary,
) -> fmt::Result {
    let rule = "-".repeat(title.len());
    writeln!(f, "{rule}")?;
    writeln!(f, "{title}")?;
    writeln!(f, "{rule}")?;
    writeln!(f)?;
    match summary.mean {
        Some(mean) => writeln!(f, "Average {label} = {mean:.6e}")?,
        None => writeln!(f, "Average {label} = n/a")?,
    }
    match summary.std {
        Some(std) => writeln!(f, "Standard deviation = {std:.6e}")?,
        None => writeln!(f, "Standard deviation = n/a")?,
    }
    Ok(())
}

impl fmt::Display for ReweightResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        writeln!(f, "Reweighting of {} frame(s)", self.len())?;
        writeln!(f)?;
        write_block(f, "FRAME PROBABILITIES", "probability", &summary.probability)?;
        writeln!(f)?;
        write_block(
            f,
            "RELATIVE FRAME WEIGHTS (exp(-E/kT))",
            "relative weight",
            &summary.relative_probability,
        )?;
        writeln!(f)?;
        write_block(f, "PERTURBATION ENERGIES", "energy", &summary.energy)
    }
}
