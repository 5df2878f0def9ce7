use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::aws::AwsSdkConnector;
use crate::defaults;
use crate::handler::credentials_file::{default_credentials_path, expand_home, CredentialsFileHandler};
use crate::mfa::{ReadMfaToken, StaticMfaTokenReader, StdinMfaTokenReader};
use crate::profile::load::aws_sdk::AwsSdkProfileLoader;
use crate::profile::load::LoadProfiles;
use crate::profile::select::menu::MenuProfileSelector;
use crate::profile::select::skim::SkimProfileSelector;
use crate::profile::select::{SelectProfile, StaticProfileSelector};
use crate::profile::{Profile, ProfileSet};
use crate::run::MfaRolers;

#[derive(Parser, Debug)]
#[command(name = "mfa-rolers", version, about)]
pub struct Args {
    /// Profile to authenticate with. Prompts with a numbered menu when omitted.
    #[arg()]
    pub profile: Option<String>,

    /// Token code provided by the MFA device.
    #[arg(short, long)]
    pub token: Option<String>,

    /// Show the profiles that can be authenticated.
    #[arg(short, long, conflicts_with_all = ["profile", "token", "fuzzy"])]
    pub list: bool,

    /// Pick the profile with a fuzzy finder instead of the numbered menu.
    #[arg(short, long)]
    pub fuzzy: bool,

    /// Credentials file section that receives the temporary credentials.
    #[arg(long, default_value = defaults::CREDENTIAL_SLOT)]
    pub slot: String,

    /// Credentials file to update. Defaults to the one the AWS CLI reads.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub credentials_file: Option<PathBuf>,

    /// Print a completion script for the given shell and exit.
    #[arg(long, value_enum, exclusive = true)]
    pub completions: Option<Shell>,
}

enum ProfileSelector {
    Menu(MenuProfileSelector),
    Skim(SkimProfileSelector),
    Static(StaticProfileSelector),
}

impl SelectProfile for ProfileSelector {
    fn select_profile<'a>(&self, profiles: &'a ProfileSet) -> anyhow::Result<Option<&'a Profile>> {
        use ProfileSelector::*;
        match self {
            Menu(s) => s.select_profile(profiles),
            Skim(s) => s.select_profile(profiles),
            Static(s) => s.select_profile(profiles),
        }
    }
}

fn selector_from(args: &Args) -> ProfileSelector {
    if let Some(profile) = args.profile.as_ref() {
        ProfileSelector::Static(StaticProfileSelector::from(profile.to_string()))
    } else if args.fuzzy {
        ProfileSelector::Skim(SkimProfileSelector::new(&args.slot))
    } else {
        ProfileSelector::Menu(MenuProfileSelector::new(&args.slot))
    }
}

enum MfaReader {
    Stdin(StdinMfaTokenReader),
    Static(StaticMfaTokenReader),
}

#[async_trait]
impl ReadMfaToken for MfaReader {
    async fn read_mfa_token(&self, mfa_serial: &str) -> anyhow::Result<String> {
        use MfaReader::*;
        match self {
            Stdin(r) => r.read_mfa_token(mfa_serial).await,
            Static(r) => r.read_mfa_token(mfa_serial).await,
        }
    }

    fn is_interactive(&self) -> bool {
        match self {
            MfaReader::Stdin(r) => r.is_interactive(),
            MfaReader::Static(r) => r.is_interactive(),
        }
    }
}

fn mfa_reader_from(args: &Args) -> MfaReader {
    if let Some(token) = args.token.as_ref() {
        MfaReader::Static(StaticMfaTokenReader::from(token))
    } else {
        MfaReader::Stdin(StdinMfaTokenReader)
    }
}

fn credentials_path_from(args: &Args) -> anyhow::Result<PathBuf> {
    args.credentials_file
        .clone()
        .map(expand_home)
        .or_else(default_credentials_path)
        .ok_or_else(|| anyhow::anyhow!("failed to determine the AWS credentials file path"))
}

/// Both sides of the store point at the same credentials file.
fn profile_store_from(args: &Args) -> anyhow::Result<(AwsSdkProfileLoader, CredentialsFileHandler)> {
    let path = credentials_path_from(args)?;
    // Read the credentials table up front so a broken file fails before any prompt.
    let handler = CredentialsFileHandler::open(&path, &args.slot)?;
    Ok((AwsSdkProfileLoader::with_credentials_file(path), handler))
}

#[derive(Debug)]
pub enum App {
    Refresh(Args),
    ListProfiles(Args),
    Completions(Shell),
}

impl From<Args> for App {
    fn from(args: Args) -> Self {
        if let Some(shell) = args.completions {
            App::Completions(shell)
        } else if args.list {
            App::ListProfiles(args)
        } else {
            App::Refresh(args)
        }
    }
}

impl App {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            App::Refresh(args) => Self::refresh(args).await,
            App::ListProfiles(args) => Self::list_profiles(args).await,
            App::Completions(shell) => {
                clap_complete::generate(shell, &mut Args::command(), "mfa-rolers", &mut io::stdout());
                Ok(())
            }
        }
    }

    async fn refresh(args: Args) -> anyhow::Result<()> {
        let (loader, handler) = profile_store_from(&args)?;
        let mfa_rolers = MfaRolers::new(
            loader,
            selector_from(&args),
            mfa_reader_from(&args),
            AwsSdkConnector,
            handler,
            &args.slot,
        );
        mfa_rolers.run().await
    }

    async fn list_profiles(args: Args) -> anyhow::Result<()> {
        let loader = AwsSdkProfileLoader::with_credentials_file(credentials_path_from(&args)?);
        let profiles = loader.load_profiles().await?;
        for p in profiles.selectable(&args.slot) {
            match p.role_arn() {
                Some(role_arn) => println!("{}\t{}", p.name(), role_arn),
                None => println!("{}", p.name()),
            }
        }
        Ok(())
    }
}
