use maat::create::{create_training_text, training_text};

use crate::{cli::TrainArgs, config::Config, shell::Shell};

use super::utils;

pub fn train(shell: &mut Shell, mut config: Config, args: TrainArgs) -> anyhow::Result<()> {
    config.apply(&args.input);

    for mut doc in utils::convert_file(shell, &config, &args.input.path)? {
        create_training_text(&mut doc)?;
        println!("{}", training_text(&doc));
    }

    Ok(())
}
