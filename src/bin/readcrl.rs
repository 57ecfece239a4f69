use std::{env, fs, path::PathBuf};
use crl_dates::{CrlHandle, CrlTable};


fn main() {
    if let Err(e) = process() {
        eprintln!("{e}");
        ::std::process::exit(1);
    }
}

fn process() -> Result<(), String> {
    let usage = usage()?;
    let data = fs::read(&usage.file)
        .map_err(|err| format!("Can’t read file: {err}"))?;

    let mut table = CrlTable::new();
    let mut handle = CrlHandle::default();
    table.decode_der(&mut handle, &data)
        .map_err(|err| format!("Can't decode CRL: {err}"))?;

    let res = table.update_dates(&handle)
        .map_err(|err| format!("Can't read update dates: {err}"));
    table.free(&mut handle)
        .map_err(|err| format!("Can't free CRL: {err}"))?;
    let (last, next) = res?;

    println!("Last update: {last}");
    match next {
        Some(next) => println!("Next update: {next}"),
        None => println!("Next update: none"),
    }
    Ok(())
}

fn usage() -> Result<Usage, String> {
    let usage = "Usage: readcrl <path>";
    if env::args().len() != 2 {
        Err(usage.to_string())
    } else {
        let file = env::args().nth(1).map(PathBuf::from).ok_or(usage)?;
        Ok(Usage { file })
    }
}

struct Usage {
    file: PathBuf,
}
