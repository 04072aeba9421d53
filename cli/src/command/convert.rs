use crate::{cli::ConvertArgs, config::Config, shell::Shell};

use super::utils;

pub fn convert(shell: &mut Shell, mut config: Config, args: ConvertArgs) -> anyhow::Result<()> {
    config.apply(&args.input);

    for doc in utils::convert_file(shell, &config, &args.input.path)? {
        println!("{}", doc.to_xml(doc.root()));
    }

    Ok(())
}
