//! Tournament business logic: registry, ledger, standings, pairings.

mod ledger;
mod pairing;
mod registry;
mod sanitize;
mod standings;

pub use ledger::{
    audit_aggregates, delete_matches, find_drift, reconcile_aggregates, report_match, tally_history,
};
pub use pairing::{pair_adjacent, swiss_pairings};
pub use registry::{delete_players, import_players_csv, parse_roster, register_player};
pub use sanitize::sanitize_name;
pub use standings::{player_standings, rank_standings, write_standings_csv};
