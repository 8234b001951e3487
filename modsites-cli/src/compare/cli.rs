use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const COMPARE_CMD: &str = "compare";

pub fn create_compare_cli() -> Command {
    Command::new(COMPARE_CMD)
        .about("Annotate two site sets, build metagene profiles, pair co-occurring sites and test for differences.")
        .arg(
            Arg::new("sites-a")
                .long("sites-a")
                .required(true)
                .help("Path to the first site set (BED6, optionally gzipped)"),
        )
        .arg(
            Arg::new("sites-b")
                .long("sites-b")
                .required(true)
                .help("Path to the second site set (BED6, optionally gzipped)"),
        )
        .arg(
            arg!(--gtf <GTF>)
                .required(true)
                .help("Path to GTF/GTF.gz transcript annotation"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("Path to a TOML run configuration"),
        )
        .arg(
            arg!(--bins <BINS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .help("Number of metagene bins (overrides the config file)"),
        )
        .arg(
            arg!(--window <WINDOW>)
                .required(false)
                .value_parser(value_parser!(u32))
                .help("Co-occurrence window in bases (overrides the config file)"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .help("Output JSON path (default: stdout)"),
        )
        .arg(
            Arg::new("protein-coding")
                .long("protein-coding")
                .action(ArgAction::SetTrue)
                .help("Only use transcripts with a protein_coding biotype"),
        )
        .arg(
            Arg::new("ensembl-to-ucsc")
                .long("ensembl-to-ucsc")
                .action(ArgAction::SetTrue)
                .help("Rename Ensembl chromosomes (1, MT) to UCSC style (chr1, chrM) in all inputs"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parse_full_command() {
        let matches = create_compare_cli()
            .try_get_matches_from([
                COMPARE_CMD,
                "--sites-a",
                "a.bed",
                "--sites-b",
                "b.bed.gz",
                "--gtf",
                "genes.gtf",
                "--bins",
                "40",
                "--window",
                "25",
                "--protein-coding",
            ])
            .unwrap();

        assert_eq!(matches.get_one::<String>("sites-a").unwrap(), "a.bed");
        assert_eq!(matches.get_one::<usize>("bins"), Some(&40));
        assert_eq!(matches.get_one::<u32>("window"), Some(&25));
        assert!(matches.get_flag("protein-coding"));
        assert!(!matches.get_flag("ensembl-to-ucsc"));
        assert_eq!(matches.get_one::<String>("config"), None);
    }

    #[rstest]
    #[case(vec![COMPARE_CMD, "--sites-a", "a.bed", "--gtf", "g.gtf"])]
    #[case(vec![COMPARE_CMD, "--sites-a", "a.bed", "--sites-b", "b.bed", "--gtf", "g.gtf", "--bins", "many"])]
    fn test_bad_arguments_are_rejected(#[case] args: Vec<&str>) {
        assert!(create_compare_cli().try_get_matches_from(args).is_err());
    }
}
