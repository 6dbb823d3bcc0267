mod expect;
mod key_opt;
mod press;
mod print;
mod send_input;
mod set_property;
mod show;
mod start;
mod stop;
mod type_text;
mod wait;

pub use expect::Expect;
pub use key_opt::KeyOpt;
pub use press::Press;
pub use print::Print;
pub use send_input::SendInput;
pub use set_property::SetProperty;
pub use show::Show;
pub use start::Start;
pub use stop::Stop;
pub use type_text::TypeText;
pub use wait::Wait;
