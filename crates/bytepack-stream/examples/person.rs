use std::path::PathBuf;

use bytepack_stream::{impl_fixed_enum, record, Guid, Record, WideString};

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
enum Kind {
    #[default]
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl_fixed_enum!(Kind: u8 { Unknown, Male, Female } else Unknown);

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Person {
        kind: Kind,
        id: Guid,
        nickname: String,
        path: PathBuf,
        name: WideString,
        age: usize,
    }
}

impl Person {
    fn print(&self) {
        println!(
            "kind = {}, id = {}, nickname = {}, path = {}, name = {}, age = {}",
            self.kind as u8,
            self.id,
            self.nickname,
            self.path.display(),
            self.name,
            self.age
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Person {
        kind: Kind::Male,
        id: Guid::new(1, 0, 0, *b"clauhban"),
        nickname: "HBann".into(),
        path: PathBuf::from(r"some\path.idk"),
        name: WideString::from("Claudiu"),
        age: 21,
    };
    start.print();

    let bytes = start.to_bytes()?;
    println!("{} bytes (predicted {})", bytes.len(), start.encoded_len());

    let end = Person::from_bytes(bytes)?;
    end.print();

    assert_eq!(start, end);
    Ok(())
}
