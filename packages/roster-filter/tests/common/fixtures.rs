//! Dataset fixtures

use roster_storage::{Contest, ContestRecord, Dataset, Enrollee, Gender};

/// Two enrollees, no contests: uid1 (90, enrolled 2020), uid2 (80, enrolled 2021)
pub fn fixture_two_enrollees() -> Dataset {
    Dataset {
        enrollees: vec![
            Enrollee::new("uid1", "Alice", 2020, 90.0),
            Enrollee::new("uid2", "Bob", 2021, 80.0),
        ],
        ..Dataset::default()
    }
}

/// The two-enrollee fixture plus one contest each
///
/// uid1 placed gold at NOIP 2023 (ZJ, rank 3); uid2 placed silver at NOI 2024
/// (BJ, rank 40).
pub fn fixture_two_with_records() -> Dataset {
    let mut dataset = fixture_two_enrollees();
    dataset.contests = vec![Contest::new(1, 2023, "NOIP"), Contest::new(2, 2024, "NOI")];
    dataset.records = vec![
        ContestRecord::new("uid1", 1, 310.0, 3, "ZJ", "gold"),
        ContestRecord::new("uid2", 2, 250.0, 40, "BJ", "silver"),
    ];
    dataset
}

const PROVINCES: [&str; 4] = ["ZJ", "BJ", "SH", "GD"];
const LEVELS: [&str; 3] = ["gold", "silver", "bronze"];

/// Deterministic population of `n` enrollees over three contests
///
/// - enrollee `i` is `e{i:04}`, enrolled `2016 + i % 6`, aggregate `(i * 37) % 101`
/// - every enrollee sat contest 1 (NOIP 2022)
/// - every third sat contest 2 (NOIP 2023)
/// - every tenth sat contest 3 (NOI 2024)
/// - province cycles through four values, level through three
pub fn fixture_population(n: usize) -> Dataset {
    let mut dataset = Dataset {
        contests: vec![
            Contest::new(1, 2022, "NOIP"),
            Contest::new(2, 2023, "NOIP"),
            Contest::new(3, 2024, "NOI"),
        ],
        ..Dataset::default()
    };

    for i in 0..n {
        let uid = format!("e{i:04}");
        let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
        dataset.enrollees.push(
            Enrollee::new(
                uid.clone(),
                format!("Enrollee {i}"),
                2016 + (i % 6) as i32,
                ((i * 37) % 101) as f64,
            )
            .with_gender(gender),
        );

        let province = PROVINCES[i % PROVINCES.len()];
        let level = LEVELS[i % LEVELS.len()];
        let rank = (i + 1) as i64;
        dataset
            .records
            .push(ContestRecord::new(uid.clone(), 1, 100.0 + (i % 50) as f64, rank, province, level));
        if i % 3 == 0 {
            dataset
                .records
                .push(ContestRecord::new(uid.clone(), 2, 150.0 + (i % 40) as f64, rank, province, level));
        }
        if i % 10 == 0 {
            dataset
                .records
                .push(ContestRecord::new(uid, 3, 200.0 + (i % 30) as f64, rank, province, "gold"));
        }
    }
    dataset
}
