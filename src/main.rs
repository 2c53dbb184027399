fn main() {
    lxdask::app::cli::run();
}
