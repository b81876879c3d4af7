//! Static fleet registry: ten broiler houses drawn from one shared stream.

use chrono::{Days, NaiveDate};
use contracts::{ClimateBias, House, HOUSE_COUNT};

use crate::rng::SeededStream;

pub const REGISTRY_SEED: &str = "houses-v1";

/// Generates houses `H01..H10` as of `reference_date`.
///
/// Every house pulls its draws from the same stream in index order, so the fleet is only
/// reproduced when all ten are generated together.
pub fn generate_houses(reference_date: NaiveDate) -> Vec<House> {
    let mut stream = SeededStream::new(REGISTRY_SEED);
    let mut houses = Vec::with_capacity(HOUSE_COUNT);

    for idx in 1..=HOUSE_COUNT {
        let id = format!("H{idx:02}");
        let floor_area = stream.integer(800, 1200) as u32;
        let capacity = (f64::from(floor_area) * 10.0).floor() as u32;
        let current_day = stream.integer(15, 35) as u32;
        let baseline_mortality = stream.range(0.08, 0.12);
        let climate_bias = stream
            .choice(&ClimateBias::ALL)
            .copied()
            .unwrap_or(ClimateBias::Stable);
        let cycle_start_date = reference_date
            .checked_sub_days(Days::new(u64::from(current_day)))
            .unwrap_or(reference_date);

        houses.push(House {
            name: format!("Broiler House {id}"),
            id,
            floor_area,
            capacity,
            baseline_mortality,
            climate_bias,
            current_birds: capacity,
            current_day,
            cycle_start_date,
        });
    }

    houses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    #[test]
    fn registry_yields_ten_sequential_ids() {
        let houses = generate_houses(reference_date());
        let ids = houses.iter().map(|house| house.id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            ["H01", "H02", "H03", "H04", "H05", "H06", "H07", "H08", "H09", "H10"]
        );
    }

    #[test]
    fn house_attributes_stay_within_draw_bounds() {
        for house in generate_houses(reference_date()) {
            assert!((800..=1200).contains(&house.floor_area));
            assert_eq!(house.capacity, house.floor_area * 10);
            assert_eq!(house.current_birds, house.capacity);
            assert!((15..=35).contains(&house.current_day));
            assert!((0.08..0.12).contains(&house.baseline_mortality));
            assert_eq!(
                reference_date() - house.cycle_start_date,
                chrono::Duration::days(i64::from(house.current_day))
            );
            assert_eq!(house.name, format!("Broiler House {}", house.id));
        }
    }

    #[test]
    fn registry_matches_recorded_fleet() {
        let houses = generate_houses(reference_date());
        let first = &houses[0];
        assert_eq!(first.floor_area, 1155);
        assert_eq!(first.current_day, 33);
        assert_eq!(first.climate_bias, ClimateBias::Stable);
        assert!((first.baseline_mortality - 0.097_658_512_329_364_68).abs() < 1e-12);

        let summary = houses
            .iter()
            .map(|house| (house.floor_area, house.current_day, house.climate_bias))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (1155, 33, ClimateBias::Stable),
                (1102, 24, ClimateBias::Humid),
                (1089, 21, ClimateBias::Cooler),
                (932, 28, ClimateBias::Stable),
                (1133, 22, ClimateBias::Cooler),
                (1005, 18, ClimateBias::Cooler),
                (1139, 16, ClimateBias::Cooler),
                (837, 17, ClimateBias::Stable),
                (1043, 29, ClimateBias::Cooler),
                (991, 27, ClimateBias::Stable),
            ]
        );
    }

    #[test]
    fn regeneration_is_identical() {
        assert_eq!(
            generate_houses(reference_date()),
            generate_houses(reference_date())
        );
    }
}
