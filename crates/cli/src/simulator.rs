use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::config::SimulatorConfig;
use super::types::RateFetcher;
use common::{FetchError, RateTable};

/// Basis points per unit.
const BPS: f64 = 10_000.0;

/// Produces synthetic quotes for a fixed universe of currencies.
///
/// Every symbol gets a mid value derived from the seed; `rate(b, t)` is
/// `mid[b] / mid[t]` nudged by a random fluctuation of at most
/// `fluctuation_bps`. The same seed always yields the same quotes.
#[derive(Debug, Clone)]
pub struct SimulatedRateFetcher {
    seed: u64,
    fluctuation: f64,
    universe: Vec<String>,
    /// Boosted pair `(from, to, multiplier)`; the loop is closed through any third currency.
    planted: Option<(String, String, f64)>,
}

impl SimulatedRateFetcher {
    pub fn new(config: &SimulatorConfig, universe: &[String]) -> Self {
        let planted = match (config.planted_multiplier, universe) {
            (Some(multiplier), [first, second, _, ..]) => {
                Some((first.clone(), second.clone(), multiplier))
            }
            _ => None,
        };

        Self {
            seed: config.seed,
            fluctuation: config.fluctuation_bps / BPS,
            universe: universe.to_vec(),
            planted,
        }
    }

    fn rng_for(&self, parts: &[&str]) -> SmallRng {
        let mixed = parts.iter().fold(self.seed ^ 0xcbf2_9ce4_8422_2325, |h, part| {
            part.bytes()
                .chain(std::iter::once(0xff))
                .fold(h, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3))
        });
        SmallRng::seed_from_u64(mixed)
    }

    /// Value of one unit of `symbol` in an arbitrary common unit, in `[0.5, 200)`.
    fn mid(&self, symbol: &str) -> f64 {
        self.rng_for(&[symbol]).random_range(0.5f64.ln()..200f64.ln()).exp()
    }

    fn quote(&self, base: &str, target: &str) -> f64 {
        let mut rate = self.mid(base) / self.mid(target);

        if self.fluctuation > 0.0 {
            let noise = self
                .rng_for(&[base, target])
                .random_range(-self.fluctuation..=self.fluctuation);
            rate *= 1.0 + noise;
        }

        if let Some((from, to, multiplier)) = &self.planted {
            if base == from && target == to {
                rate *= multiplier;
            } else if base == to && target == from {
                rate /= multiplier;
            }
        }

        rate
    }
}

#[async_trait]
impl RateFetcher for SimulatedRateFetcher {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        if !self.universe.iter().any(|s| s == base) {
            return Err(FetchError::NoData(base.to_string()));
        }

        Ok(self
            .universe
            .iter()
            .filter(|target| target.as_str() != base)
            .map(|target| (target.clone(), self.quote(base, target)))
            .collect())
    }
}
