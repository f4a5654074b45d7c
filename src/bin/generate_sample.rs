use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const COLONIES: [(&str, f64, f64); 4] = [
    // name, mean age (weeks), spread
    ("B6-WT", 18.0, 6.0),
    ("APP-KI", 30.0, 9.0),
    ("Tau-P301S", 24.0, 5.0),
    ("Cre-Lox", 12.0, 4.0),
];

const COHORTS: [&str; 3] = ["Behaviour 2024", "Imaging Q3", "Aging Study"];

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_colony.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "Mouse ID",
        "Life Status",
        "Sex",
        "Colony Name",
        "All Cohorts",
        "Current Mating",
        "Age (Weeks)",
    ])?;

    let mut row_id = 0;
    for &(colony, mean_age, spread) in &COLONIES {
        let n = 15 + (rng.next_u64() % 20) as usize;
        for _ in 0..n {
            row_id += 1;
            let age = rng.gauss(mean_age, spread).round().max(3.0) as i64;
            let status = if rng.chance(0.15) { "Deceased" } else { "Alive" };
            let sex = rng.pick(&["M", "F"]);
            let cohort = if rng.chance(0.4) { "" } else { rng.pick(&COHORTS) };
            let mating = if rng.chance(0.7) {
                String::new()
            } else {
                format!("{colony} pair {}", 1 + rng.next_u64() % 6)
            };

            writer.write_record([
                format!("M{row_id:04}"),
                status.to_string(),
                sex.to_string(),
                colony.to_string(),
                cohort.to_string(),
                mating,
                age.to_string(),
            ])?;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {row_id} mice across {} colonies to {output_path}",
        COLONIES.len()
    );
    Ok(())
}
