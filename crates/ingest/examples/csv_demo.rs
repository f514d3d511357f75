use ingest::{parse_csv, CsvConfig};

const SAMPLE: &str = "\
name,age,active,score
Alice,30,true,4.5
Bob,,false,NA
Carol,25,True,3
";

fn main() {
    let cfg = CsvConfig::default();

    match parse_csv(SAMPLE.as_bytes(), &cfg) {
        Ok(docs) => {
            for doc in &docs {
                for (key, value) in doc.iter() {
                    println!("{key:>8}: {value:?}");
                }
                println!();
            }
        }
        Err(err) => eprintln!("parse failed: {err}"),
    }

    let limited = CsvConfig::default().with_max_rows(2);
    if let Err(err) = parse_csv(SAMPLE.as_bytes(), &limited) {
        eprintln!("row limit enforced: {err}");
    }
}
