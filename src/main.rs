use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use bboxkit::classes::save_classes;
use bboxkit::{
    change_cls_order, load_batch, load_imgs, merge_prior_contents, remove_cls_from, save_batch,
    split_imgset, Args, ClassSpec, Command, ImageSet, Result,
};

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Classes { spec } => {
            for class in ClassSpec::from_args(&spec).resolve()? {
                println!("{}", class);
            }
        }
        Command::Scan {
            img_dir,
            nproc,
            output,
        } => {
            let contents = load_imgs(&img_dir, nproc)?;
            save_batch(&output, &contents)?;
        }
        Command::Remap {
            input,
            old_classes,
            new_classes,
            output,
        } => {
            let old_classes = ClassSpec::from_args(&old_classes).resolve()?;
            let new_classes = ClassSpec::from_args(&new_classes).resolve()?;
            let mut contents = load_batch(&input)?;
            let stats = change_cls_order(&mut contents, &old_classes, &new_classes)?;
            stats.print_summary();
            save_batch(&output, &contents)?;
        }
        Command::Remove {
            input,
            old_classes,
            remove,
            output,
            classes_out,
        } => {
            let old_classes = ClassSpec::from_args(&old_classes).resolve()?;
            let mut contents = load_batch(&input)?;
            let new_classes = remove_cls_from(&mut contents, &old_classes, &remove)?;
            save_batch(&output, &contents)?;
            match classes_out {
                Some(path) => save_classes(&path, &new_classes)?,
                None => {
                    for class in &new_classes {
                        println!("{}", class);
                    }
                }
            }
        }
        Command::Merge {
            base,
            prior,
            merge_type,
            output,
        } => {
            let mut bases = load_batch(&base)?;
            let priors = load_batch(&prior)?;
            merge_prior_contents(&mut bases, &priors, merge_type)?;
            save_batch(&output, &bases)?;
        }
        Command::Split {
            input,
            imgset,
            output,
        } => {
            let contents = load_batch(&input)?;
            let split = split_imgset(&contents, &ImageSet::File(imgset))?;
            if !split.missing.is_empty() {
                info!("{} imageset entries had no record", split.missing.len());
            }
            save_batch(&output, &split.to_owned_contents())?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
