use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let import = clap::Command::new("import")
        .about("Upload the posts in an export to an instance")
        .arg(
            clap::arg!(-f --file <FILE> "WordPress export (WXR) file")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-b --blog <ALIAS> "Alias of the existing blog to import into"))
        .arg(clap::arg!(--"new-blogs" "Create a new blog for every channel in the export"))
        .arg(clap::arg!(-u --user <USER> "Username to sign in with"))
        .arg(clap::arg!(-i --instance <URL> "Instance address (default: https://write.as)"))
        .arg(clap::arg!(--profile <NAME> "Saved instance profile to use"))
        .arg(clap::arg!(--remember "Save the access token under the profile name after signing in"))
        .arg(
            clap::arg!(--instances <PATH> "Instance store location")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-d --"dry-run" "Convert everything but do not upload"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"));

    let convert = clap::Command::new("convert")
        .about("Convert an export to JSON without uploading anything")
        .arg(clap::arg!(-f --file <FILE> "WordPress export (WXR) file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        );

    let completions = clap::Command::new("completions")
        .about("Print a shell completion script")
        .arg(clap::arg!(<SHELL> "Shell").value_parser(["bash", "zsh", "fish", "powershell", "elvish"]));

    let mut cmd = clap::Command::new("wp-import")
        .version(env!("CARGO_PKG_VERSION"))
        .author("wp-import Contributors")
        .about("Import WordPress exports into Write.as and WriteFreely")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand_required(true)
        .subcommand(import)
        .subcommand(convert)
        .subcommand(completions);

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "wp-import", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "wp-import", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "wp-import", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "wp-import", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
