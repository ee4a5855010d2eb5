use std::path::PathBuf;

use ballistics::config::CatalogConfig;
use ballistics::logging::{LogOutput, init_logging, raise_level};
use ballistics::models::{Base, Projectile};
use ballistics::records::{RecordLocator, Registry, YamlDirectory};
use clap::{Arg, ArgMatches, Command};
use tracing::{debug, info};

fn main() {
    let matches = Command::new("ballistics")
        .version(env!("CARGO_PKG_VERSION"))
        .about("弾丸データベース (Projectile Catalog)")
        .long_about("宣言的なYAMLレコードから弾丸データを読み込み、検証して表示します。\n\
                     弾底形状と弾道係数から推奨抗力関数を決定します。")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("設定ファイル(.yaml)のパスを指定")
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("レコードデータのルートディレクトリ (既定: data)")
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("NAME")
                .help("読み込むソース名を限定")
        )
        .arg(
            Arg::new("id")
                .short('i')
                .long("id")
                .value_name("ID")
                .help("指定した識別子の弾丸のみ表示")
        )
        .arg(
            Arg::new("base")
                .short('b')
                .long("base")
                .value_name("BASE")
                .help("弾底形状で絞り込み (flat, boat, fb, bt など)")
                .conflicts_with("id")
        )
        .arg(
            Arg::new("params")
                .long("params")
                .action(clap::ArgAction::SetTrue)
                .help("概要の代わりに抗力パラメータを表示")
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(clap::ArgAction::SetTrue)
                .help("登録済みのグループとソースを表示して終了")
                .conflicts_with_all(["id", "base", "params"])
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .value_parser(clap::value_parser!(LogOutput))
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: debug, -vv: trace)")
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => CatalogConfig::from_file(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.data_dir = PathBuf::from(dir);
    }

    let mut log_config = config.log_config();
    log_config.level = raise_level(log_config.level, matches.get_count("verbose"));
    if let Some(output) = matches.get_one::<LogOutput>("log-output") {
        log_config.output = *output;
    }
    let _guard = init_logging(&log_config)?;

    let registry = Registry::scan(&config.data_dir)?;
    debug!(data_dir = %config.data_dir.display(), "レジストリを構築しました");

    if matches.get_flag("list") {
        print_registry(&registry);
        return Ok(());
    }

    let locator = RecordLocator::new(registry, YamlDirectory::new(&config.data_dir));
    let file = matches.get_one::<String>("file").map(String::as_str);
    let show_params = matches.get_flag("params");

    if let Some(id) = matches.get_one::<String>("id") {
        let projectile = Projectile::find_by_id(&locator, file, id)?;
        print_projectile(id, &projectile, show_params)?;
        return Ok(());
    }

    let base = matches
        .get_one::<String>("base")
        .map(|b| Base::normalize(b))
        .transpose()?;
    let projectiles = locator.find_all_where(file, |p: &Projectile| base.is_none() || p.base() == base)?;
    info!(count = projectiles.len(), "弾丸を読み込みました");

    for (id, projectile) in &projectiles {
        print_projectile(id, projectile, show_params)?;
        println!();
    }

    Ok(())
}

fn print_projectile(id: &str, projectile: &Projectile, show_params: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show_params {
        println!("# {}", id);
        print!("{}", serde_yaml::to_string(&projectile.params())?);
    } else {
        println!("{}", projectile);
    }
    Ok(())
}

fn print_registry(registry: &Registry) {
    if registry.is_empty() {
        println!("登録済みのグループはありません");
        return;
    }
    for (group, sources) in registry.groups() {
        println!("{}:", group);
        for source in sources {
            println!("  {}", source);
        }
    }
}
