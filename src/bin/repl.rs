use dice_eval::{roll, Limits, MarkdownStringifier};
use std::io::{self, BufRead, Write};

fn roll_line(line: &str) -> dice_eval::Result<String> {
    let ast = dice_eval::parse(line)?;
    let result = roll::eval(&ast, rand::thread_rng(), Limits::default())?;
    Ok(roll::render(
        &mut MarkdownStringifier,
        &ast,
        &result.rolls,
        result.total,
    ))
}

fn dist_line(line: &str) -> dice_eval::Result<String> {
    let dist = dice_eval::distribution(line)?;
    let total = dist.total_weight() as f64;
    let mut out = String::new();
    for (value, weight) in dist.iter() {
        out.push_str(&format!("{:>6} {:>8.4}%\n", value, weight as f64 / total * 100.0));
    }
    out.push_str(&format!("mean {:.4}", dist.mean()));
    Ok(out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        let line = line.trim();
        if !line.is_empty() {
            let res = match line.strip_prefix(":dist") {
                Some(expr) => dist_line(expr.trim()),
                None => roll_line(line),
            };
            match res {
                Ok(r) => println!("{}", r),
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
