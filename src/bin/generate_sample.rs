use anyhow::Context;

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

    /// Uniform integer in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    // Branch/city pairs of the reference dataset.
    let branches = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];
    let customer_types = ["Member", "Normal"];
    let genders = ["Female", "Male"];
    let product_lines = [
        "Health and beauty",
        "Electronic accessories",
        "Home and lifestyle",
        "Sports and travel",
        "Food and beverages",
        "Fashion accessories",
    ];
    let payments = ["Ewallet", "Cash", "Credit card"];

    let n_rows = 1000;
    let output_path = "supermarkt_sales.csv";

    let mut writer =
        csv::Writer::from_path(output_path).with_context(|| format!("creating {output_path}"))?;
    writer
        .write_record([
            "Invoice ID",
            "Branch",
            "City",
            "Customer_type",
            "Gender",
            "Product line",
            "Unit price",
            "Quantity",
            "Tax 5%",
            "Total",
            "Date",
            "Time",
            "Payment",
            "cogs",
            "gross margin percentage",
            "gross income",
            "Rating",
        ])
        .context("writing header")?;

    for _ in 0..n_rows {
        let (branch, city) = branches[rng.below(branches.len() as u64) as usize];

        let unit_price = 10.0 + rng.next_f64() * 90.0;
        let quantity = 1 + rng.below(10);
        let cogs = unit_price * quantity as f64;
        let tax = cogs * 0.05;
        let total = cogs + tax;

        // Store opening hours: 10:00–20:59.
        let hour = 10 + rng.below(11);
        let minute = rng.below(60);
        let second = rng.below(60);

        let month = 1 + rng.below(3);
        let day = 1 + rng.below(28);
        let rating = 4.0 + rng.next_f64() * 6.0;

        let invoice_id = format!(
            "{:03}-{:02}-{:04}",
            rng.below(1000),
            rng.below(100),
            rng.below(10000)
        );

        let record = [
            invoice_id,
            branch.to_string(),
            city.to_string(),
            rng.pick(&customer_types).to_string(),
            rng.pick(&genders).to_string(),
            rng.pick(&product_lines).to_string(),
            format!("{unit_price:.2}"),
            quantity.to_string(),
            format!("{tax:.4}"),
            format!("{total:.4}"),
            format!("{month}/{day}/2019"),
            format!("{hour:02}:{minute:02}:{second:02}"),
            rng.pick(&payments).to_string(),
            format!("{cogs:.2}"),
            "4.761904762".to_string(),
            format!("{tax:.4}"),
            format!("{rating:.1}"),
        ];
        writer.write_record(&record).context("writing row")?;
    }

    writer.flush().context("flushing output")?;
    println!("Wrote {n_rows} transactions to {output_path}");
    Ok(())
}
