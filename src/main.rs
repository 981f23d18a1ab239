use std::{fs, path::PathBuf, process::exit};

use structopt::StructOpt;
use tomasulo_sim::{
    config::{load_config, Config},
    cpu::Cpu,
    error::SimResult,
    mem::MainMemory,
    out_of_order::OutOfOrder,
    program::Program,
    report::CycleReport,
};

#[derive(StructOpt, Debug)]
#[structopt(name = "Tomasulo out-of-order core simulator")]
struct Opt {
    /// Path of the instruction file to run
    #[structopt(short, long, parse(from_os_str))]
    file: PathBuf,

    /// Configuration file (.yaml, or the `<key> = <value>` text format)
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Only print the final cycle count and registers
    #[structopt(short, long)]
    quiet: bool,
}

fn run(opt: &Opt) -> SimResult<()> {
    let config = match &opt.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let prog = fs::read_to_string(&opt.file)?.parse::<Program>()?;
    let mem = MainMemory::new(config.memory_size, config.initial_mem_value);

    let quiet = opt.quiet;
    let mut last_arf = String::new();
    let res = OutOfOrder::new(prog, &config, mem).run_with(|cpu| {
        if !quiet {
            print!("{}", CycleReport(cpu));
        }
        last_arf = cpu.arf().to_string();
    })?;

    println!("Total number of cycles = {}", res.stats.cycles_taken);
    print!("{last_arf}");
    println!(
        "Instructions retired: {}, IPC: {:.2}",
        res.stats.insts_retired,
        res.stats.insts_retired as f32 / res.stats.cycles_taken.max(1) as f32
    );

    Ok(())
}

fn main() {
    env_logger::init();

    let opt = Opt::from_args();
    if let Err(err) = run(&opt) {
        eprintln!("{}: {}", opt.file.display(), err);
        exit(1);
    }
}
