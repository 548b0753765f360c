use log::error;

fn main() {
    env_logger::init();

    if let Err(e) = cali_ais::get_arg().and_then(cali_ais::run) {
        error!("{e:#}");
        std::process::exit(-1);
    }
}
