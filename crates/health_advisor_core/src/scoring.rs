//! crates/health_advisor_core/src/scoring.rs
//!
//! Pure, deterministic scoring rules: BMI categorization, BMR estimation,
//! and the PHQ-style mental-health screening. These are total functions over
//! their typed inputs with no I/O.

/// Body Mass Index: weight over height squared, height given in centimetres.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// The four fixed BMI bands, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Thresholds: <18.5 underweight, [18.5, 25) normal, [25, 30) overweight,
    /// >=30 obese.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Sex category used by the BMR formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

/// Basal Metabolic Rate estimate. An affine function of weight, height and
/// age with per-sex constants:
///
/// male:   88.36 + 13.4 w + 4.8 h - 5.7 a
/// female: 447.6 +  9.2 w + 3.1 h - 4.3 a
pub fn bmr(sex: Sex, weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
    match sex {
        Sex::Male => 88.36 + 13.4 * weight_kg + 4.8 * height_cm - 5.7 * age_years,
        Sex::Female => 447.6 + 9.2 * weight_kg + 3.1 * height_cm - 4.3 * age_years,
    }
}

/// One ordinal answer on the screening questionnaire, mapped to 0..=3 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLevel {
    Never,
    SeveralDays,
    MoreThanHalfTheDays,
    NearlyEveryDay,
}

impl ResponseLevel {
    pub fn points(self) -> u32 {
        match self {
            ResponseLevel::Never => 0,
            ResponseLevel::SeveralDays => 1,
            ResponseLevel::MoreThanHalfTheDays => 2,
            ResponseLevel::NearlyEveryDay => 3,
        }
    }

    /// Converts a raw form value (0..=3) into a level. Anything else is
    /// rejected at the boundary.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ResponseLevel::Never),
            1 => Some(ResponseLevel::SeveralDays),
            2 => Some(ResponseLevel::MoreThanHalfTheDays),
            3 => Some(ResponseLevel::NearlyEveryDay),
            _ => None,
        }
    }
}

/// Severity bands for the screening total, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScreeningCategory {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl ScreeningCategory {
    /// Fixed score bands: 0-4 minimal, 5-9 mild, 10-14 moderate,
    /// 15-19 moderately severe, 20+ severe. Contiguous and gapless over the
    /// whole range of possible totals.
    pub fn from_total(total: u32) -> Self {
        match total {
            0..=4 => ScreeningCategory::Minimal,
            5..=9 => ScreeningCategory::Mild,
            10..=14 => ScreeningCategory::Moderate,
            15..=19 => ScreeningCategory::ModeratelySevere,
            _ => ScreeningCategory::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScreeningCategory::Minimal => "Minimal",
            ScreeningCategory::Mild => "Mild",
            ScreeningCategory::Moderate => "Moderate",
            ScreeningCategory::ModeratelySevere => "Moderately severe",
            ScreeningCategory::Severe => "Severe",
        }
    }
}

/// The outcome of one screening submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningResult {
    pub total: u32,
    pub category: ScreeningCategory,
}

/// Sums the ordinal responses and derives the severity band. Total and
/// deterministic for any number of responses; the sum is bounded by 3N.
pub fn screening_score(responses: &[ResponseLevel]) -> ScreeningResult {
    let total: u32 = responses.iter().map(|r| r.points()).sum();
    ScreeningResult {
        total,
        category: ScreeningCategory::from_total(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_formula() {
        // 60 kg at 170 cm -> 60 / 1.7^2
        let value = bmi(60.0, 170.0);
        assert!((value - 20.761245674740486).abs() < 1e-9);
    }

    #[test]
    fn bmi_category_thresholds() {
        assert_eq!(BmiCategory::from_bmi(18.4999), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.9999), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.9999), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn bmi_category_monotone_in_severity() {
        let mut previous = BmiCategory::from_bmi(10.0);
        let mut value = 10.0;
        while value < 45.0 {
            let current = BmiCategory::from_bmi(value);
            assert!(current >= previous, "severity regressed at bmi {value}");
            previous = current;
            value += 0.1;
        }
    }

    #[test]
    fn bmr_male_reference_value() {
        // 88.36 + 13.4*60 + 4.8*170 - 5.7*25
        let value = bmr(Sex::Male, 60.0, 170.0, 25.0);
        assert!((value - 1565.86).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn bmr_female_reference_value() {
        // 447.6 + 9.2*60 + 3.1*170 - 4.3*25
        let value = bmr(Sex::Female, 60.0, 170.0, 25.0);
        assert!((value - 1419.1).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn bmr_is_affine_in_weight() {
        let base = bmr(Sex::Male, 60.0, 170.0, 25.0);
        let plus_one = bmr(Sex::Male, 61.0, 170.0, 25.0);
        assert!((plus_one - base - 13.4).abs() < 1e-9);
    }

    #[test]
    fn response_level_raw_mapping() {
        assert_eq!(ResponseLevel::from_raw(0), Some(ResponseLevel::Never));
        assert_eq!(ResponseLevel::from_raw(3), Some(ResponseLevel::NearlyEveryDay));
        assert_eq!(ResponseLevel::from_raw(4), None);
        for raw in 0..=3u8 {
            assert_eq!(ResponseLevel::from_raw(raw).unwrap().points(), raw as u32);
        }
    }

    #[test]
    fn screening_sum_is_bounded() {
        let responses = [ResponseLevel::NearlyEveryDay; 9];
        let result = screening_score(&responses);
        assert_eq!(result.total, 27);
        assert_eq!(result.category, ScreeningCategory::Severe);

        let result = screening_score(&[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.category, ScreeningCategory::Minimal);
    }

    #[test]
    fn screening_bands_are_contiguous_and_gapless() {
        let mut previous = ScreeningCategory::from_total(0);
        for total in 0..=30u32 {
            let current = ScreeningCategory::from_total(total);
            // Severity never decreases and never jumps by more than one band.
            assert!(current >= previous, "severity regressed at total {total}");
            assert!(
                (current as u8) - (previous as u8) <= 1,
                "band gap at total {total}"
            );
            previous = current;
        }
    }

    #[test]
    fn screening_band_edges() {
        assert_eq!(ScreeningCategory::from_total(4), ScreeningCategory::Minimal);
        assert_eq!(ScreeningCategory::from_total(5), ScreeningCategory::Mild);
        assert_eq!(ScreeningCategory::from_total(9), ScreeningCategory::Mild);
        assert_eq!(ScreeningCategory::from_total(10), ScreeningCategory::Moderate);
        assert_eq!(
            ScreeningCategory::from_total(19),
            ScreeningCategory::ModeratelySevere
        );
        assert_eq!(ScreeningCategory::from_total(20), ScreeningCategory::Severe);
    }

    #[test]
    fn mixed_responses_sum() {
        let responses = [
            ResponseLevel::Never,
            ResponseLevel::SeveralDays,
            ResponseLevel::MoreThanHalfTheDays,
            ResponseLevel::NearlyEveryDay,
        ];
        let result = screening_score(&responses);
        assert_eq!(result.total, 6);
        assert_eq!(result.category, ScreeningCategory::Mild);
    }
}
