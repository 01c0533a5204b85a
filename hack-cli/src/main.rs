//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
    process,
};

use hack::prelude::*;
use jack_compiler::{compile_with, CompileConf, OutputMode};
use log::{debug, error, info};
use serde::Deserialize;

static USAGE: &str = r#"
usage: hack CMD PATH

PATH is a single source file or a directory of them.

commands:
    compile     Compile .jack files into .vm files
    analyze     Write the parse tree of .jack files as .xml
    tokens      Write the tokens of .jack files as T.xml
    translate   Translate .vm files into one .asm file
    asm         Assemble a .asm file into a .hack file

examples:
    hack compile Square/
    hack analyze Square/Main.jack
    hack translate FibonacciElement/
    hack asm Max.asm
"#;

/// Optional settings, read from `hack.yaml` in the working directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConf {
    /// Translator settings. When absent, directories are translated
    /// with a bootstrap and single files without.
    translate: Option<TranslatorConf>,
}

impl CliConf {
    const FILENAME: &'static str = "hack.yaml";

    fn load() -> Result<Self, Box<dyn Error>> {
        let path = Path::new(Self::FILENAME);
        if !path.is_file() {
            return Ok(CliConf::default());
        }

        let mut file = fs::File::open(path)?;
        let conf: CliConf = serde_yaml::from_reader(&mut file)?;
        debug!("loaded configuration: {:#?}", conf);
        Ok(conf)
    }
}

/// Source files with the given extension. A directory is searched
/// one level deep, in name order.
fn discover(path: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = vec![];
    for entry in fs::read_dir(path)? {
        let file = entry?.path();
        if file.is_file() && file.extension().map_or(false, |ext| ext == extension) {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compile each `.jack` unit on its own. A failing unit is reported
/// and skipped, and writes no output.
fn run_compiler(path: &Path, mode: OutputMode) -> Result<usize, Box<dyn Error>> {
    let conf = CompileConf { mode };
    let mut failures = 0;

    for file in discover(path, "jack")? {
        info!("compiling {}", file.display());

        let result = fs::read_to_string(&file)
            .map_err(Box::<dyn Error>::from)
            .and_then(|source| compile_with(&source, &conf).map_err(Box::<dyn Error>::from));

        match result {
            Ok(output) => {
                let name = unit_name(&file);
                let out_path = match mode {
                    OutputMode::Vm => file.with_extension("vm"),
                    OutputMode::Tree => file.with_extension("xml"),
                    OutputMode::Tokens => file.with_file_name(format!("{name}T.xml")),
                };
                fs::write(&out_path, output)?;
                debug!("wrote {}", out_path.display());
            }
            Err(err) => {
                error!("{}: {}", file.display(), err);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Translate all `.vm` units into a single assembly file.
fn run_translator(path: &Path, cli_conf: &CliConf) -> Result<usize, Box<dyn Error>> {
    let conf = cli_conf.translate.clone().unwrap_or_else(|| TranslatorConf {
        bootstrap: path.is_dir(),
        ..TranslatorConf::default()
    });

    let out_path = if path.is_dir() {
        path.join(format!("{}.asm", unit_name(path)))
    } else {
        path.with_extension("asm")
    };

    let mut translator = Translator::new(conf)?;
    let mut failures = 0;

    for file in discover(path, "vm")? {
        info!("translating {}", file.display());
        let source = fs::read_to_string(&file)?;
        if let Err(err) = translator.translate_unit(&unit_name(&file), &source) {
            error!("{}: {}", file.display(), err);
            failures += 1;
        }
    }

    if failures == 0 {
        fs::write(&out_path, translator.finish()?)?;
        debug!("wrote {}", out_path.display());
    }

    Ok(failures)
}

fn run_assembler(path: &Path) -> Result<usize, Box<dyn Error>> {
    let mut failures = 0;

    for file in discover(path, "asm")? {
        info!("assembling {}", file.display());
        let source = fs::read_to_string(&file)?;

        match hack::assemble(&source) {
            Ok(words) => {
                let out_path = file.with_extension("hack");
                fs::write(&out_path, hack::to_hack_text(&words)?)?;
                debug!("wrote {} words to {}", words.len(), out_path.display());
            }
            Err(err) => {
                error!("{}: {}", file.display(), err);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let cmd = match parse_args() {
        Some(cmd) => cmd,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    };

    let path = PathBuf::from(cmd.filepath());
    if !path.exists() {
        error!("no such file or directory: {}", path.display());
        // FreeBSD EX_NOINPUT (66)
        process::exit(66)
    }

    let conf = CliConf::load()?;

    let failures = match cmd {
        Cmd::Compile { .. } => run_compiler(&path, OutputMode::Vm)?,
        Cmd::Analyze { .. } => run_compiler(&path, OutputMode::Tree)?,
        Cmd::Tokens { .. } => run_compiler(&path, OutputMode::Tokens)?,
        Cmd::Translate { .. } => run_translator(&path, &conf)?,
        Cmd::Asm { .. } => run_assembler(&path)?,
    };

    if failures > 0 {
        error!("{} unit(s) failed", failures);
        // FreeBSD EX_DATAERR (65)
        process::exit(65)
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;
    let filepath = args.next()?;

    match cmd.as_str() {
        "compile" => Some(Cmd::Compile { filepath }),
        "analyze" => Some(Cmd::Analyze { filepath }),
        "tokens" => Some(Cmd::Tokens { filepath }),
        "translate" => Some(Cmd::Translate { filepath }),
        "asm" => Some(Cmd::Asm { filepath }),
        _ => None,
    }
}

fn print_usage() {
    println!("Hack toolchain v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    Compile { filepath: String },
    Analyze { filepath: String },
    Tokens { filepath: String },
    Translate { filepath: String },
    Asm { filepath: String },
}

impl Cmd {
    fn filepath(&self) -> &str {
        match self {
            Cmd::Compile { filepath }
            | Cmd::Analyze { filepath }
            | Cmd::Tokens { filepath }
            | Cmd::Translate { filepath }
            | Cmd::Asm { filepath } => filepath,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const GOOD: &str = "class Good { function int one() { return 1; } }";
    const BAD: &str = "class Bad { function int big() { return 32768; } }";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("hack_cli_{}_{}", name, process::id()));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_failed_unit_does_not_stop_directory() {
        let dir = scratch_dir("compile");
        fs::write(dir.join("Bad.jack"), BAD).unwrap();
        fs::write(dir.join("Good.jack"), GOOD).unwrap();
        fs::write(dir.join("notes.txt"), "not a unit").unwrap();

        assert_eq!(run_compiler(&dir, OutputMode::Vm).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(dir.join("Good.vm")).unwrap(),
            "function Good.one 0\npush constant 1\nreturn\n"
        );
        assert!(!dir.join("Bad.vm").exists());

        assert_eq!(run_compiler(&dir, OutputMode::Tokens).unwrap(), 1);
        assert!(dir.join("GoodT.xml").exists());
        assert!(!dir.join("BadT.xml").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_single_file() {
        let dir = scratch_dir("single");
        let file = dir.join("Good.jack");
        fs::write(&file, GOOD).unwrap();

        assert_eq!(run_compiler(&file, OutputMode::Tree).unwrap(), 0);
        let xml = fs::read_to_string(dir.join("Good.xml")).unwrap();
        assert!(xml.starts_with("<class>\n  <keyword> class </keyword>\n"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_translation_failure_writes_nothing() {
        let dir = scratch_dir("translate");
        fs::write(dir.join("Main.vm"), "function Main.main 0\npush constant 1\nreturn\n").unwrap();
        fs::write(dir.join("Sys.vm"), "function Sys.init 0\npop constant 0\n").unwrap();

        assert_eq!(run_translator(&dir, &CliConf::default()).unwrap(), 1);
        assert!(!dir.join(format!("{}.asm", unit_name(&dir))).exists());

        fs::remove_file(dir.join("Sys.vm")).unwrap();
        assert_eq!(run_translator(&dir, &CliConf::default()).unwrap(), 0);
        let asm = fs::read_to_string(dir.join(format!("{}.asm", unit_name(&dir)))).unwrap();
        assert!(asm.contains("(Main.main)"));

        fs::remove_dir_all(&dir).ok();
    }
}
