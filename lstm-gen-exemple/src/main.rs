use std::path::Path;

use lstm_gen_core::model::char_lstm::WEIGHTS_FILE;
use lstm_gen_core::{CharLstm, Generator, ModelConfig, Vocabulary};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model_dir = Path::new("./model");

    // Without trained artifacts, bootstrap a vocabulary from the corpus and
    // an untrained model with the default architecture (6 x 160).
    // The output will be noise, but the server can start from it.
    if !model_dir.join(WEIGHTS_FILE).exists() {
        let vocabulary = Vocabulary::from_file("./data/corpus.txt")?;
        let config = ModelConfig::for_vocabulary(vocabulary.size());
        let model = CharLstm::random(config, &mut rand::rng());
        Generator::from_parts(vocabulary, model)?.save(model_dir)?;
        log::info!("Wrote untrained artifacts to {}", model_dir.display());
    }

    // Load through the same path as the server: vocabulary, weights, shape checks
    let generator = Generator::new(model_dir)?;
    println!("Vocabulary: {} characters", generator.vocabulary().size());

    // Seeds must only use characters of the vocabulary
    match generator.generate("\u{1F980}", 10) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected seed: {e}"),
    }

    // Generate a few samples from the first vocabulary character
    let seed: String = generator.vocabulary().chars().iter().take(1).collect();
    for i in 0..5 {
        println!("Sample {}: {}", i + 1, generator.generate(&seed, 80)?);
    }

    Ok(())
}
