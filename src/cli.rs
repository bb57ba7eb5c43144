// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("ledgerloop")
        .about("Personal budgeting with recurring templates, forecasts, and month close")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("checking|savings|cash|card (free text)"),
                        ),
                )
                .subcommand(Command::new("list").about("List accounts"))
                .subcommand(
                    Command::new("rm")
                        .about("Remove an account")
                        .arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("list").about("List categories"))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a category")
                        .arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("direction")
                                .long("direction")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("direction").long("direction"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("verify")
                        .about("Mark a transaction as verified against the statement")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("unverify")
                        .about("Clear the verified flag")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Edit a transaction")
                        .arg(id_arg())
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("desc").long("desc"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("Refused on rows generated by a recurring template"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Manage recurring templates")
                .subcommand(
                    Command::new("add")
                        .about("Add a recurring template")
                        .arg(
                            Arg::new("direction")
                                .long("direction")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("desc").long("desc").required(true))
                        .arg(Arg::new("account").long("account"))
                        .arg(
                            Arg::new("cadence")
                                .long("cadence")
                                .required(true)
                                .help("weekly|biweekly|monthly|custom"),
                        )
                        .arg(
                            Arg::new("anchor")
                                .long("anchor")
                                .required(true)
                                .help("First occurrence date, YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("day-of-month")
                                .long("day-of-month")
                                .value_parser(value_parser!(u32))
                                .help("Monthly target day 1-31; defaults to the anchor's day"),
                        )
                        .arg(
                            Arg::new("every-days")
                                .long("every-days")
                                .value_parser(value_parser!(u32))
                                .help("Step in days for the custom cadence"),
                        )
                        .arg(
                            Arg::new("until")
                                .long("until")
                                .help("No occurrences after this date, YYYY-MM-DD"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List recurring templates"),
                ))
                .subcommand(
                    Command::new("pause")
                        .about("Stop generating occurrences")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("resume")
                        .about("Resume generating occurrences")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a template; materialized history stays")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("month")
                .about("Monthly view and close workflow")
                .subcommand(json_flags(
                    Command::new("view")
                        .about("Materialize due occurrences, then show the month with forecasts")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(
                            Arg::new("as-of")
                                .long("as-of")
                                .help("Treat this date as today (YYYY-MM-DD)"),
                        ),
                ))
                .subcommand(
                    Command::new("status")
                        .about("Show close readiness for a month")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("as-of").long("as-of")),
                )
                .subcommand(
                    Command::new("close")
                        .about("Close a month once every real entry is verified")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("as-of").long("as-of")),
                )
                .subcommand(
                    Command::new("reopen")
                        .about("Reopen a closed month")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
                )
                .subcommand(
                    Command::new("set-opening")
                        .about("Set the month's opening balance")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("amount").long("amount").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("cashflow")
                        .about("Per-month income, expenses, and savings")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize))
                                .help("How many months back (default 12)"),
                        ),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
}
