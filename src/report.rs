/// Run reports. Built once per scenario, rendered as text or JSON.

use crate::config::ReportFormat;
use crate::errors::SimResult;
use crate::simulation::Estimate;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    pub scenario: &'static str,
    pub moves: String,
    pub estimate: f64,
    pub std_error: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub trials: usize,
    pub seed: u64,
    /// Exact or closed-form reference value, when one exists
    pub analytic: Option<f64>,
    pub started_at: String,
    pub elapsed_ms: f64,
}

impl RunReport {
    pub fn new(
        scenario: &'static str,
        moves: String,
        estimate: &Estimate,
        seed: u64,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let elapsed_ms = (chrono::Utc::now() - started_at)
            .num_microseconds()
            .map(|us| us as f64 / 1_000.0)
            .unwrap_or(0.0);

        Self {
            scenario,
            moves,
            estimate: estimate.value,
            std_error: estimate.std_error,
            ci_lower: estimate.ci_lower,
            ci_upper: estimate.ci_upper,
            trials: estimate.trials,
            seed,
            analytic: None,
            started_at: started_at.to_rfc3339(),
            elapsed_ms,
        }
    }

    pub fn with_analytic(mut self, value: f64) -> Self {
        self.analytic = Some(value);
        self
    }

    pub fn render(&self, format: ReportFormat) -> SimResult<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string(self)?),
            ReportFormat::Text => {
                let mut line = format!(
                    "{}: {:.6} (se {:.6}, 95% CI [{:.6}, {:.6}], n={}, moves={}, seed={})",
                    self.scenario,
                    self.estimate,
                    self.std_error,
                    self.ci_lower,
                    self.ci_upper,
                    self.trials,
                    self.moves,
                    self.seed,
                );
                if let Some(a) = self.analytic {
                    line.push_str(&format!(" analytic={a:.6}"));
                }
                Ok(line)
            }
        }
    }
}
