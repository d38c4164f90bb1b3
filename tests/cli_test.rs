use buildsite::cli::{Args, Command};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("buildsite")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_git_subcommand_defaults() {
    let args = make_args(&[
        "git",
        "--source",
        "https://gitbox.apache.org/repos/asf/www-site.git",
        "--project",
        "www",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(!parsed.verbose);
    match parsed.command {
        Command::Git(git) => {
            assert_eq!(git.source, "https://gitbox.apache.org/repos/asf/www-site.git");
            assert_eq!(git.project, "www");
            assert_eq!(git.sourcebranch, "main");
            assert_eq!(git.outputbranch, "asf-site");
            assert_eq!(git.count, 0);
            assert!(!git.listen);
        }
        other => panic!("expected git subcommand, got {:?}", other),
    }
}

#[test]
fn test_git_subcommand_requires_source_and_project() {
    let args = make_args(&["git", "--project", "www"]);
    assert!(Args::try_parse_from(args).is_err());

    let args = make_args(&["git", "--source", "url"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_git_subcommand_all_flags() {
    let args = make_args(&[
        "-v",
        "git",
        "--source",
        "url",
        "--project",
        "tvm",
        "--sourcebranch",
        "site",
        "--outputbranch",
        "published",
        "--count",
        "25",
        "--listen",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.verbose);
    match parsed.command {
        Command::Git(git) => {
            assert_eq!(git.sourcebranch, "site");
            assert_eq!(git.outputbranch, "published");
            assert_eq!(git.count, 25);
            assert!(git.listen);
        }
        other => panic!("expected git subcommand, got {:?}", other),
    }
}

#[test]
fn test_dir_subcommand_defaults() {
    let args = make_args(&["dir"]);
    let parsed = Args::try_parse_from(args).unwrap();

    match parsed.command {
        Command::Dir(dir) => {
            assert_eq!(dir.output, PathBuf::from("site-generated"));
            assert_eq!(dir.yaml_dir, PathBuf::from("."));
            assert_eq!(dir.content_dir, PathBuf::from("content"));
            assert!(!dir.listen);
        }
        other => panic!("expected dir subcommand, got {:?}", other),
    }
}

#[test]
fn test_kick_subcommand_defaults() {
    let args = make_args(&["kick", "--repo", "tvm-site"]);
    let parsed = Args::try_parse_from(args).unwrap();

    match parsed.command {
        Command::Kick(kick) => {
            assert_eq!(kick.repo, "tvm-site");
            assert_eq!(kick.sourcebranch, "main");
            assert_eq!(kick.outputbranch, "asf-site");
            assert_eq!(kick.theme, "theme");
            assert_eq!(kick.notify, "private@infra.apache.org");
            assert_eq!(kick.min_pages, 0);
        }
        other => panic!("expected kick subcommand, got {:?}", other),
    }
}

#[test]
fn test_subcommand_is_required() {
    let args = make_args(&["-v"]);
    assert!(Args::try_parse_from(args).is_err());
}
