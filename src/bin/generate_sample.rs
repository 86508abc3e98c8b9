use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const GENRES: [&str; 10] = [
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Drama",
    "Family",
    "Horror",
    "Romance",
    "Science Fiction",
];

const DIRECTORS: [&str; 8] = [
    "Ava Lindqvist",
    "Bruno Okafor",
    "Chen Wei",
    "Dana Moretti",
    "Emil Sato",
    "Farah Nasser",
    "Gus Ortega",
    "Hana Kowalski",
];

const WORDS: [&str; 12] = [
    "Midnight", "Harbor", "Echo", "Crimson", "Summer", "Iron", "Last", "Garden", "Signal",
    "Orbit", "Silent", "River",
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleMovie {
    id: i64,
    title: String,
    budget: String,
    revenue: f64,
    vote_average: f64,
    vote_count: i64,
    popularity: f64,
    runtime: Option<f64>,
    release_date: String,
    genres: Option<String>,
    director: String,
    tagline: Option<String>,
    overview: String,
}

fn generate(rng: &mut SimpleRng, id: i64) -> SampleMovie {
    let title = format!("{} {}", rng.pick(&WORDS), rng.pick(&WORDS));

    // Log-normal budgets around $30M, a tenth of them unknown (0).
    let budget = if rng.below(10) == 0 {
        0.0
    } else {
        (rng.gauss(17.2, 1.1).exp() / 1e5).round() * 1e5
    };
    let multiplier = rng.gauss(0.9, 0.9).exp();
    let revenue = if rng.below(12) == 0 {
        0.0
    } else {
        (budget.max(2e6) * multiplier / 1e3).round() * 1e3
    };

    let n_genres = 1 + rng.below(3);
    let mut labels: Vec<&str> = Vec::with_capacity(n_genres);
    while labels.len() < n_genres {
        let g = rng.pick(&GENRES);
        if !labels.contains(&g) {
            labels.push(g);
        }
    }

    let year = 1960 + rng.below(56) as i64;
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    // Mixed formats as found in real exports; a few are unusable.
    let release_date = match rng.below(20) {
        0 => "TBA".to_string(),
        // Two-digit years only where they parse back unambiguously.
        1..=9 if year >= 1970 => format!("{month}/{day}/{:02}", year % 100),
        1..=9 => format!("{month}/{day}/{year}"),
        _ => format!("{year}-{month:02}-{day:02}"),
    };

    SampleMovie {
        id,
        title,
        // A handful of corrupted budget cells exercise the degradation rules.
        budget: if rng.below(50) == 0 {
            "unknown".to_string()
        } else {
            format!("{budget:.0}")
        },
        revenue,
        vote_average: (rng.gauss(6.2, 0.9).clamp(0.0, 10.0) * 10.0).round() / 10.0,
        vote_count: (rng.gauss(5.5, 1.5).exp()) as i64,
        popularity: (rng.gauss(0.0, 1.0).exp() * 100.0).round() / 100.0,
        runtime: (rng.below(25) != 0).then(|| (rng.gauss(105.0, 18.0).max(60.0)).round()),
        release_date,
        genres: (rng.below(30) != 0).then(|| labels.join("|")),
        director: rng.pick(&DIRECTORS).to_string(),
        tagline: (rng.below(4) != 0).then(|| format!("Every {} has a {}.", rng.pick(&WORDS), rng.pick(&WORDS))),
        overview: format!(
            "A story of {}, {} and the {} that binds them.",
            rng.pick(&WORDS).to_lowercase(),
            rng.pick(&WORDS).to_lowercase(),
            rng.pick(&WORDS).to_lowercase()
        ),
    }
}

fn write_csv(movies: &[SampleMovie], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record([
            "id",
            "original_title",
            "budget",
            "revenue",
            "vote_average",
            "vote_count",
            "popularity",
            "runtime",
            "release_date",
            "genres",
            "director",
            "tagline",
            "overview",
        ])
        .expect("Failed to write CSV header");
    for m in movies {
        writer
            .write_record([
                m.id.to_string(),
                m.title.clone(),
                m.budget.clone(),
                format!("{:.0}", m.revenue),
                m.vote_average.to_string(),
                m.vote_count.to_string(),
                m.popularity.to_string(),
                m.runtime.map(|r| r.to_string()).unwrap_or_default(),
                m.release_date.clone(),
                m.genres.clone().unwrap_or_default(),
                m.director.clone(),
                m.tagline.clone().unwrap_or_default(),
                m.overview.clone(),
            ])
            .expect("Failed to write CSV record");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn text_column(movies: &[SampleMovie], f: impl Fn(&SampleMovie) -> Option<String>) -> ArrayRef {
    Arc::new(StringArray::from(movies.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(movies: &[SampleMovie], path: &str) {
    let text = |f: fn(&SampleMovie) -> Option<String>| text_column(movies, f);

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("original_title", DataType::Utf8, true),
        Field::new("budget", DataType::Utf8, true),
        Field::new("revenue", DataType::Float64, true),
        Field::new("vote_average", DataType::Float64, true),
        Field::new("vote_count", DataType::Int64, true),
        Field::new("popularity", DataType::Float64, true),
        Field::new("runtime", DataType::Float64, true),
        Field::new("release_date", DataType::Utf8, true),
        Field::new("genres", DataType::Utf8, true),
        Field::new("director", DataType::Utf8, true),
        Field::new("tagline", DataType::Utf8, true),
        Field::new("overview", DataType::Utf8, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(movies.iter().map(|m| m.id).collect::<Vec<_>>())),
        text(|m| Some(m.title.clone())),
        text(|m| Some(m.budget.clone())),
        Arc::new(Float64Array::from(movies.iter().map(|m| m.revenue).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(
            movies.iter().map(|m| m.vote_average).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(movies.iter().map(|m| m.vote_count).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(
            movies.iter().map(|m| m.popularity).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(movies.iter().map(|m| m.runtime).collect::<Vec<_>>())),
        text(|m| Some(m.release_date.clone())),
        text(|m| m.genres.clone()),
        text(|m| Some(m.director.clone())),
        text(|m| m.tagline.clone()),
        text(|m| Some(m.overview.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let movies: Vec<SampleMovie> = (0..1000).map(|id| generate(&mut rng, id)).collect();

    write_csv(&movies, "sample_movies.csv");
    write_parquet(&movies, "sample_movies.parquet");

    println!(
        "Wrote {} movies to sample_movies.csv and sample_movies.parquet",
        movies.len()
    );
}
