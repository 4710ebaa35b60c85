use std::fs::File;
use std::io::{self, BufReader};
use std::process::exit;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;

use vsv::{reader, App, Args, ConfigManager, Dataset, APP_NAME};

fn load(args: &Args) -> Result<Dataset> {
    let delimiter = args.delimiter_byte().map_err(color_eyre::eyre::Report::msg)?;
    let use_stdin = match &args.path {
        None => true,
        Some(path) => path.as_os_str() == "-",
    };

    if use_stdin {
        let stdin = io::stdin().lock();
        if args.psql {
            reader::read_psql_table(stdin, args.count)
        } else if args.mysql {
            reader::read_mysql_table(stdin, args.count)
        } else {
            reader::read_delimited(stdin, delimiter, !args.no_header, args.count)
        }
    } else {
        let path = args.path.as_ref().unwrap();
        let file = BufReader::new(File::open(path)?);
        if args.psql {
            reader::read_psql_table(file, args.count)
        } else if args.mysql {
            reader::read_mysql_table(file, args.count)
        } else {
            reader::read_delimited(file, delimiter, !args.no_header, args.count)
        }
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
        match event::read()? {
            Event::Key(key) => app.key(key),
            Event::Resize(width, height) => app.resize(width, height),
            _ => {}
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn main() {
    let args = Args::parse();

    // Load before touching the terminal so parse errors print cleanly.
    let data = match load(&args) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    let config = match ConfigManager::new(APP_NAME).and_then(|manager| manager.load()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    if let Err(err) = color_eyre::install() {
        eprintln!("{}", err);
        exit(1);
    }

    let mut app = App::new(data, &config);
    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app);
    ratatui::restore();

    if let Err(err) = result {
        eprintln!("{}", err);
        exit(1);
    }
}
