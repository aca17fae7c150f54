//! `fvm ssh-key` handlers.

use fvm_cli::api::types::NewSshKey;
use fvm_cli::display::{render_ssh_keys, to_json};
use fvm_cli::normalise_public_key;

use super::{Console, Session, read_local_file};
use crate::CliError;
use crate::cli::{AddKeyArgs, RemoveKeyArgs, SshKeyCommand};

pub(crate) async fn run(console: &Console, command: SshKeyCommand) -> Result<(), CliError> {
    let session = Session::connect()?;
    match command {
        SshKeyCommand::List => {
            let keys = session.client.list_ssh_keys().await?;
            if keys.is_empty() && !console.format().is_json() {
                console.status("No SSH keys registered.");
                return Ok(());
            }
            console.result(&render_ssh_keys(&keys, console.format())?)
        }
        SshKeyCommand::Add(args) => add(console, &session, &args).await,
        SshKeyCommand::Remove(args) => remove(console, &session, &args).await,
    }
}

/// Picks the key text from `--key`, `--key-file`, or the configuration.
fn key_material(session: &Session, args: &AddKeyArgs) -> Result<String, CliError> {
    if let Some(key) = &args.key {
        return Ok(normalise_public_key(key)?);
    }
    if let Some(path) = &args.key_file {
        return Ok(normalise_public_key(&read_local_file(path)?)?);
    }
    Ok(session.config.require_ssh_public_key()?)
}

async fn add(console: &Console, session: &Session, args: &AddKeyArgs) -> Result<(), CliError> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::Input(String::from("SSH key name must not be empty")));
    }
    let request = NewSshKey {
        name: name.to_owned(),
        public_key: key_material(session, args)?,
    };
    let key = session.client.add_ssh_key(&request).await?;
    if console.format().is_json() {
        return console.result(&to_json(&key)?);
    }
    console.success(format!("SSH key '{}' added", key.name));
    console.result(&render_ssh_keys(&[key], console.format())?)
}

async fn remove(
    console: &Console,
    session: &Session,
    args: &RemoveKeyArgs,
) -> Result<(), CliError> {
    let fingerprint = args.fingerprint.trim();
    let prompt = format!("Remove SSH key {fingerprint}?");
    if !console.confirm(&prompt, args.force)? {
        console.status("Removal cancelled.");
        return Ok(());
    }
    let response = session.client.remove_ssh_key(fingerprint).await?;
    if console.format().is_json() {
        return console.result(&to_json(&response)?);
    }
    console.success(format!("SSH key {fingerprint} removed"));
    Ok(())
}
