#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogLanguages,
    PairsList,
    PairsSources,
    PairsTargets,
    PackagesRefresh,
    PackagesList,
    PackagesInstall,
    Translate,
    HistoryList,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.languages" => Command::CatalogLanguages,
            "pairs.list" => Command::PairsList,
            "pairs.sources" => Command::PairsSources,
            "pairs.targets" => Command::PairsTargets,
            "packages.refresh" => Command::PackagesRefresh,
            "packages.list" => Command::PackagesList,
            "packages.install" => Command::PackagesInstall,
            "translate" => Command::Translate,
            "history.list" => Command::HistoryList,
            _ => Command::Unknown,
        }
    }
}
