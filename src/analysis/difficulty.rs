use serde::{Deserialize, Serialize};

/// Уровень сложности слова, от самого частотного к самому редкому
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyBand {
    A1,
    A2,
    B1,
    B2C1,
    C1C2,
}

impl DifficultyBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::A1 => "A1-equivalent",
            Self::A2 => "A2-equivalent",
            Self::B1 => "B1-equivalent",
            Self::B2C1 => "B2/C1-equivalent",
            Self::C1C2 => "C1/C2-equivalent",
        }
    }
}

impl std::fmt::Display for DifficultyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Нижние границы уровней по оценке Zipf
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub a1: f64,
    pub a2: f64,
    pub b1: f64,
    pub b2c1: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            a1: 5.5,
            a2: 4.5,
            b1: 3.5,
            b2c1: 2.5,
        }
    }
}

impl BandThresholds {
    /// Уровень для оценки; всё ниже последнего порога (и 0.0 для
    /// незнакомых словарю слов) - самый редкий уровень
    pub fn classify(&self, score: f64) -> DifficultyBand {
        if score >= self.a1 {
            DifficultyBand::A1
        } else if score >= self.a2 {
            DifficultyBand::A2
        } else if score >= self.b1 {
            DifficultyBand::B1
        } else if score >= self.b2c1 {
            DifficultyBand::B2C1
        } else {
            DifficultyBand::C1C2
        }
    }
}

/// Классификация с порогами по умолчанию
pub fn classify(score: f64) -> DifficultyBand {
    BandThresholds::default().classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_labels() {
        assert_eq!(classify(6.0).label(), "A1-equivalent");
        assert_eq!(classify(5.0).label(), "A2-equivalent");
        assert_eq!(classify(4.0).label(), "B1-equivalent");
        assert_eq!(classify(3.0).label(), "B2/C1-equivalent");
        assert_eq!(classify(1.0).label(), "C1/C2-equivalent");
        assert_eq!(classify(0.0).label(), "C1/C2-equivalent");
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        assert_eq!(classify(5.5), DifficultyBand::A1);
        assert_eq!(classify(4.5), DifficultyBand::A2);
        assert_eq!(classify(3.5), DifficultyBand::B1);
        assert_eq!(classify(2.5), DifficultyBand::B2C1);
        assert_eq!(classify(2.499), DifficultyBand::C1C2);
    }

    #[test]
    fn test_nan_is_rarest() {
        assert_eq!(classify(f64::NAN), DifficultyBand::C1C2);
    }
}
